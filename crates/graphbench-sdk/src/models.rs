//! Data models for the graphbench SDK
//!
//! These types represent traversal results and are produced by both
//! EmbeddedClient and RemoteClient.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One value emitted by a traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GraphValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A vertex reference (id and label only, no properties)
    Vertex { id: String, label: String },
    /// An edge reference
    Edge { id: String, label: String },
    List(Vec<GraphValue>),
    Map(BTreeMap<String, GraphValue>),
}

impl GraphValue {
    /// Get string value if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GraphValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GraphValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Element id for vertices/edges, or the value itself when the traversal
    /// already projected ids with `id()`.
    pub fn as_element_id(&self) -> Option<String> {
        match self {
            GraphValue::Vertex { id, .. } | GraphValue::Edge { id, .. } => Some(id.clone()),
            GraphValue::String(s) => Some(s.clone()),
            GraphValue::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for GraphValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphValue::Null => write!(f, "null"),
            GraphValue::Boolean(b) => write!(f, "{}", b),
            GraphValue::Integer(i) => write!(f, "{}", i),
            GraphValue::Float(fl) => write!(f, "{}", fl),
            GraphValue::String(s) => write!(f, "{}", s),
            GraphValue::Vertex { id, label } => write!(f, "v[{}:{}]", id, label),
            GraphValue::Edge { id, label } => write!(f, "e[{}:{}]", id, label),
            GraphValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            GraphValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, val)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Kind of graph element an index applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Vertex,
    Edge,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Vertex => "vertex",
            ElementType::Edge => "edge",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
