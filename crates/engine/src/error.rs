//! Engine-level error types.

use thiserror::Error;

use nodes::NodeError;

/// Errors produced by the run driver.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An item failed and the run does not continue on failure.
    ///
    /// `message` already includes the remote detail, if the API sent one.
    #[error("item {item_index} failed: {message}")]
    ItemFailed {
        /// 0-based index of the failing item.
        item_index: usize,
        message: String,
        #[source]
        source: NodeError,
    },
}

impl EngineError {
    pub fn item_failed(item_index: usize, source: NodeError) -> Self {
        Self::ItemFailed {
            item_index,
            message: source.describe(),
            source,
        }
    }

    pub fn item_index(&self) -> usize {
        match self {
            Self::ItemFailed { item_index, .. } => *item_index,
        }
    }
}
