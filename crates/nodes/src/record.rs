//! `ResultRecord`: the per-item output a node hands back to the host.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::http::HttpMethod;
use crate::NodeError;

/// Where the item's request went and when it finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// ISO-8601 UTC, millisecond precision.
    pub timestamp: String,
}

impl Metadata {
    pub fn now(endpoint: Option<String>, method: Option<HttpMethod>) -> Self {
        Self {
            endpoint,
            method,
            timestamp: iso_timestamp(),
        }
    }
}

/// Payload of a record: the raw response, or the error that replaced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Data {
        data: Value,
    },
    Error {
        error: String,
        #[serde(rename = "errorDetail", skip_serializing_if = "Option::is_none")]
        error_detail: Option<Value>,
    },
}

/// One output item. `success` always agrees with the [`Outcome`] variant;
/// build records through [`ResultRecord::succeeded`] and
/// [`ResultRecord::failed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub operation: String,
    pub success: bool,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub metadata: Metadata,
    /// Index of the input item this record answers (0-based).
    pub paired_item: usize,
}

impl ResultRecord {
    pub fn succeeded(
        operation: impl Into<String>,
        data: Value,
        metadata: Metadata,
        paired_item: usize,
    ) -> Self {
        Self {
            operation: operation.into(),
            success: true,
            outcome: Outcome::Data { data },
            metadata,
            paired_item,
        }
    }

    pub fn failed(
        operation: impl Into<String>,
        err: &NodeError,
        metadata: Metadata,
        paired_item: usize,
    ) -> Self {
        Self {
            operation: operation.into(),
            success: false,
            outcome: Outcome::Error {
                error: err.to_string(),
                error_detail: err.remote_detail().cloned(),
            },
            metadata,
            paired_item,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Data { data } => Some(data),
            Outcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Data { .. } => None,
            Outcome::Error { error, .. } => Some(error),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
