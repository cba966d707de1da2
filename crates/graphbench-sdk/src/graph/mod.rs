//! In-memory property graph used by the embedded client
//!
//! Vertices carry a single label and a property map; edges are directed,
//! typed, and may repeat between the same pair of vertices.

pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeType, Label, NodeId};
