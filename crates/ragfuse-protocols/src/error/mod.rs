//! Error types for the ragfuse protocol layer.

mod cache;
mod protocol;
mod retrieval;

pub use cache::*;
pub use protocol::*;
pub use retrieval::*;
