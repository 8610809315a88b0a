//! The `ExecutableNode` trait: the contract every node must fulfil.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{NodeError, ResultRecord};

/// Shared, read-only context for one run of a node.
///
/// Defined here (in the nodes crate) so both the engine and individual node
/// implementations can import it without a circular dependency.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// ID of the current execution run.
    pub execution_id: uuid::Uuid,
    /// Decrypted credentials keyed by credential type name (e.g. `tidiApi`).
    pub credentials: HashMap<String, Value>,
}

impl ExecutionContext {
    pub fn new(execution_id: uuid::Uuid) -> Self {
        Self {
            execution_id,
            credentials: HashMap::new(),
        }
    }

    pub fn with_credentials(mut self, name: impl Into<String>, values: Value) -> Self {
        self.credentials.insert(name.into(), values);
        self
    }

    /// Resolve the credential set `name` for the item at `item_index`.
    ///
    /// Credentials are run-scoped today; the index is accepted so nodes ask
    /// for them the same way they ask for parameters. A malformed set fails
    /// with a fixed message: deserializer errors can quote secret values.
    pub fn credentials<T: DeserializeOwned>(
        &self,
        name: &str,
        _item_index: usize,
    ) -> Result<T, NodeError> {
        let raw = self
            .credentials
            .get(name)
            .ok_or_else(|| NodeError::configuration(format!("no credentials set for '{name}'")))?;
        serde_json::from_value(raw.clone()).map_err(|_| {
            NodeError::configuration(format!(
                "invalid credentials '{name}': expected an object with the required fields"
            ))
        })
    }
}

/// One input item: its position in the run and its resolved parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemContext {
    /// 0-based position in the input sequence.
    pub index: usize,
    pub parameters: Map<String, Value>,
}

impl ItemContext {
    pub fn new(index: usize, parameters: Map<String, Value>) -> Self {
        Self { index, parameters }
    }

    /// Build items from a JSON array of parameter objects.
    pub fn from_json_array(items: Vec<Value>) -> Result<Vec<Self>, NodeError> {
        items
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Object(parameters) => Ok(Self::new(index, parameters)),
                other => Err(NodeError::configuration(format!(
                    "item {index} must be a JSON object, got {other}"
                ))),
            })
            .collect()
    }

    /// Value of `name` on this item, or `default` when absent or null.
    pub fn parameter<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T, NodeError> {
        match self.parameters.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
                NodeError::configuration(format!("parameter '{name}' has the wrong type: {e}"))
            }),
        }
    }

    /// Deserialize every parameter of the item into one typed struct.
    pub fn resolve<T: DeserializeOwned>(&self) -> Result<T, NodeError> {
        serde_json::from_value(Value::Object(self.parameters.clone()))
            .map_err(|e| NodeError::configuration(e.to_string()))
    }
}

/// The core node trait.
///
/// `execute` handles exactly one item and must not depend on other items;
/// ordering and failure policy belong to the run driver.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Registered type name of the node (e.g. `tidiNode`).
    fn name(&self) -> &str;

    /// Handle one item and return its result record.
    async fn execute(
        &self,
        item: &ItemContext,
        ctx: &ExecutionContext,
    ) -> Result<ResultRecord, NodeError>;

    /// Record to emit for `item` when `execute` failed and the run continues.
    fn failure_record(&self, item: &ItemContext, err: &NodeError) -> ResultRecord {
        let operation = item
            .parameter::<String>("operation", "unknown".into())
            .unwrap_or_else(|_| "unknown".into());
        ResultRecord::failed(operation, err, crate::record::Metadata::now(None, None), item.index)
    }
}
