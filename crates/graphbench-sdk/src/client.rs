//! Client traits: the unified interface for embedded and remote stores

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{ElementType, GraphValue};
use crate::traversal::Traversal;

/// Traversal execution against a graph store.
///
/// Implemented by:
/// - `EmbeddedClient`: in-process, no network (for tests and dry runs)
/// - `RemoteClient`: a Gremlin Server reached over HTTP
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Execute a traversal and collect every value it produces
    async fn execute(&self, traversal: &Traversal) -> ClientResult<Vec<GraphValue>>;

    /// Check that the store is reachable
    async fn ping(&self) -> ClientResult<()>;

    /// Release the session. Later calls fail with a connection error.
    async fn close(&self) -> ClientResult<()>;
}

/// Secondary-index administration.
///
/// `create_index` must be idempotent: asking for an index that already exists
/// succeeds.
#[async_trait]
pub trait IndexAdmin: Send + Sync {
    async fn create_index(&self, element: ElementType, property_key: &str) -> ClientResult<()>;
}
