//! graphbench SDK: traversal builder and graph clients
//!
//! Provides two client implementations:
//!
//! - **`RemoteClient`**: posts Gremlin-Groovy scripts to a running Gremlin
//!   Server over HTTP and decodes the GraphSON answer.
//!
//! - **`EmbeddedClient`**: in-process, no network. Evaluates traversals
//!   directly against an in-memory `GraphStore`. Used for tests and dry runs.
//!
//! Both implement the `GraphClient` and `IndexAdmin` traits.
//!
//! # Quick Start
//!
//! ```rust
//! use graphbench_sdk::{EmbeddedClient, GraphClient, PropertyMap, Traversal};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = EmbeddedClient::new();
//!     {
//!         let mut store = client.store_write().await;
//!         let mut props = PropertyMap::new();
//!         props.insert("primaryTitle".to_string(), "Metropolis".into());
//!         store.create_node_with_properties("title", props);
//!     }
//!
//!     let titles = client
//!         .execute(&Traversal::v().values("primaryTitle"))
//!         .await
//!         .unwrap();
//!     println!("Found {} titles", titles.len());
//! }
//! ```

pub mod client;
pub mod embedded;
pub mod error;
pub mod eval;
pub mod graph;
pub mod models;
pub mod remote;
pub mod traversal;

// ============================================================
// Core SDK types
// ============================================================

pub use client::{GraphClient, IndexAdmin};
pub use embedded::EmbeddedClient;
pub use error::{ClientError, ClientResult};
pub use models::{ElementType, GraphValue};
pub use remote::{ConnectOptions, RemoteClient, DEFAULT_INDEX_PROCEDURE};

// ============================================================
// Traversal algebra
// ============================================================

pub use traversal::{anon, property_contains, IdFormat, OrderKey, Source, Step, Traversal, P};
pub use eval::{EvalError, EvalResult, TraversalEvaluator};

// ============================================================
// Graph types (in-memory store)
// ============================================================

pub use graph::{
    Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStore, Label, Node, NodeId,
    PropertyMap, PropertyValue,
};
