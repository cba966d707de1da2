//! EmbeddedClient: in-process graph client
//!
//! Evaluates traversals directly against a shared `GraphStore`, no network
//! needed.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::client::{GraphClient, IndexAdmin};
use crate::error::{ClientError, ClientResult};
use crate::eval::TraversalEvaluator;
use crate::graph::GraphStore;
use crate::models::{ElementType, GraphValue};
use crate::traversal::Traversal;

/// In-process client that wraps a GraphStore directly.
///
/// No network overhead; traversals execute in the same process.
/// Used by the test suite and for dry runs against a synthetic dataset.
pub struct EmbeddedClient {
    pub(crate) store: Arc<RwLock<GraphStore>>,
    closed: AtomicBool,
}

impl EmbeddedClient {
    /// Create a new EmbeddedClient with a fresh empty graph store
    pub fn new() -> Self {
        Self::with_store(Arc::new(RwLock::new(GraphStore::new())))
    }

    /// Create an EmbeddedClient wrapping an existing store
    pub fn with_store(store: Arc<RwLock<GraphStore>>) -> Self {
        Self {
            store,
            closed: AtomicBool::new(false),
        }
    }

    /// Get a reference to the underlying store (for direct graph manipulation)
    pub fn store(&self) -> &Arc<RwLock<GraphStore>> {
        &self.store
    }

    /// Acquire a read lock on the store.
    pub async fn store_read(&self) -> tokio::sync::RwLockReadGuard<'_, GraphStore> {
        self.store.read().await
    }

    /// Acquire a write lock on the store.
    ///
    /// Use for direct mutation (create_node, create_edge, etc.).
    pub async fn store_write(&self) -> tokio::sync::RwLockWriteGuard<'_, GraphStore> {
        self.store.write().await
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> ClientResult<()> {
        if self.is_closed() {
            Err(ClientError::ConnectionError("client is closed".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for EmbeddedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphClient for EmbeddedClient {
    async fn execute(&self, traversal: &Traversal) -> ClientResult<Vec<GraphValue>> {
        self.ensure_open()?;
        let store = self.store.read().await;
        TraversalEvaluator::new(&store)
            .evaluate(traversal)
            .map_err(|e| ClientError::QueryError(e.to_string()))
    }

    async fn ping(&self) -> ClientResult<()> {
        self.ensure_open()
    }

    async fn close(&self) -> ClientResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl IndexAdmin for EmbeddedClient {
    async fn create_index(&self, element: ElementType, property_key: &str) -> ClientResult<()> {
        self.ensure_open()?;
        let created = self
            .store
            .write()
            .await
            .create_property_index(element, property_key);
        if created {
            tracing::debug!("created {} index on '{}'", element, property_key);
        } else {
            tracing::debug!("{} index on '{}' already exists", element, property_key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PropertyMap;

    #[tokio::test]
    async fn test_execute_against_shared_store() {
        let client = EmbeddedClient::new();
        {
            let mut store = client.store_write().await;
            let mut props = PropertyMap::new();
            props.insert("name".to_string(), "Ann".into());
            store.create_node_with_properties("person", props);
        }
        let out = client
            .execute(&Traversal::v().values("name"))
            .await
            .unwrap();
        assert_eq!(out, vec![GraphValue::String("Ann".into())]);
    }

    #[tokio::test]
    async fn test_closed_client_rejects_calls() {
        let client = EmbeddedClient::new();
        client.ping().await.unwrap();
        client.close().await.unwrap();
        assert!(client.is_closed());
        let err = client.execute(&Traversal::v().count()).await.unwrap_err();
        assert!(err.is_connection_error());
        assert!(client.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_create_index_is_idempotent() {
        let client = EmbeddedClient::new();
        client.create_index(ElementType::Vertex, "name").await.unwrap();
        client.create_index(ElementType::Vertex, "name").await.unwrap();
        assert!(client
            .store_read()
            .await
            .has_property_index(ElementType::Vertex, "name"));
    }

    #[tokio::test]
    async fn test_evaluation_errors_are_query_errors() {
        let client = EmbeddedClient::new();
        let err = client
            .execute(&Traversal::v().count().out("wrote"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::QueryError(_)));
    }
}
