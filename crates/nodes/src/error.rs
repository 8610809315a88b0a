//! Node-level error types.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by a node while handling a single item.
///
/// Neither variant is retried; the run driver either records the failure on
/// the item's result or aborts the run, depending on its continue-on-failure
/// policy.
#[derive(Debug, Error, Clone)]
pub enum NodeError {
    /// The item's parameters or credentials cannot be turned into a request
    /// (unknown operation, unsupported language, wrongly typed field, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The HTTP exchange failed or the remote API answered non-2xx.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl NodeError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Structured body returned by the remote API, if any.
    pub fn remote_detail(&self) -> Option<&Value> {
        match self {
            Self::Configuration(_) => None,
            Self::Transport(e) => e.detail.as_ref(),
        }
    }

    /// Human-readable message with the remote detail appended when present.
    pub fn describe(&self) -> String {
        match self.remote_detail() {
            Some(detail) => format!("{self} - {}", render_detail(detail)),
            None => self.to_string(),
        }
    }
}

fn render_detail(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Failure reported by an [`HttpTransport`](crate::http::HttpTransport).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// HTTP status, when the server answered at all.
    pub status: Option<u16>,
    /// Response body of a non-2xx answer, kept verbatim for diagnostics.
    pub detail: Option<Value>,
}

impl TransportError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            detail: None,
        }
    }

    /// The server answered with a non-success status.
    pub fn status(status: u16, detail: Option<Value>) -> Self {
        Self {
            message: format!("Request failed with status code {status}"),
            status: Some(status),
            detail,
        }
    }
}
