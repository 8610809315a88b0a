//! Node run driver.
//!
//! `NodeExecutor` runs one node over an ordered list of items:
//! 1. Items are handled strictly one after another, in input order.
//! 2. Each item goes through `ExecutableNode::execute` exactly once.
//! 3. On failure the configured policy decides: record the error on the
//!    item's result and carry on, or stop the run and return the error.

use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use nodes::{ExecutableNode, ExecutionContext, ItemContext, ResultRecord};

use crate::EngineError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-run failure policy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutorConfig {
    /// Turn item failures into `success: false` records instead of
    /// aborting the run.
    pub continue_on_failure: bool,
}

// ---------------------------------------------------------------------------
// NodeExecutor
// ---------------------------------------------------------------------------

/// Stateless driver; one instance can serve any number of runs.
#[derive(Debug, Clone, Default)]
pub struct NodeExecutor {
    config: ExecutorConfig,
}

impl NodeExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `node` over `items` and return one record per item, in order.
    ///
    /// # Errors
    /// Returns [`EngineError::ItemFailed`] for the first failing item when
    /// `continue_on_failure` is off. Items after it are not executed.
    #[instrument(
        skip(self, node, items, ctx),
        fields(node = node.name(), execution_id = %ctx.execution_id, items = items.len())
    )]
    pub async fn run(
        &self,
        node: &dyn ExecutableNode,
        items: &[ItemContext],
        ctx: &ExecutionContext,
    ) -> Result<Vec<ResultRecord>, EngineError> {
        let mut records = Vec::with_capacity(items.len());

        for item in items {
            match node.execute(item, ctx).await {
                Ok(record) => {
                    info!(item = item.index, operation = %record.operation, "item succeeded");
                    records.push(record);
                }

                Err(err) if self.config.continue_on_failure => {
                    warn!(item = item.index, "item failed, continuing: {}", err);
                    records.push(node.failure_record(item, &err));
                }

                Err(err) => {
                    error!(item = item.index, "item failed, aborting run: {}", err);
                    return Err(EngineError::item_failed(item.index, err));
                }
            }
        }

        info!("run finished with {} records", records.len());
        Ok(records)
    }
}
