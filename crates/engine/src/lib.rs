//! `engine` crate: runs a node over the items of one execution and applies
//! the continue-on-failure policy.

pub mod error;
pub mod executor;

pub use error::EngineError;
pub use executor::{ExecutorConfig, NodeExecutor};
