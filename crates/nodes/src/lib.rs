//! `nodes` crate: the `ExecutableNode` trait, the HTTP transport seam, and
//! the Tidi scheduling node.
//!
//! Every node must implement [`ExecutableNode`]. The engine crate dispatches
//! items through this trait object.

pub mod error;
pub mod http;
pub mod mock;
pub mod record;
pub mod tidi;
pub mod traits;

pub use error::{NodeError, TransportError};
pub use http::{HttpRequestDescriptor, HttpTransport, ReqwestTransport};
pub use record::ResultRecord;
pub use tidi::{TidiConfig, TidiNode};
pub use traits::{ExecutableNode, ExecutionContext, ItemContext};
