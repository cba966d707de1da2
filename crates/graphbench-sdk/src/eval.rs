//! Traversal evaluation over the in-memory graph store
//!
//! A straightforward stream interpreter: every step maps the whole stream of
//! traversers to a new stream. Semantics follow TinkerPop where the workload
//! depends on them:
//! - `union` feeds the whole input stream to every branch, so branch-local
//!   `limit`/`tail` see all traversers (first/last selection works);
//! - `order().by(..)` is a stable ascending sort and drops traversers whose
//!   key is missing;
//! - `values` skips elements that lack the property.

use std::cmp::Ordering;
use std::collections::HashSet;

use thiserror::Error;

use crate::graph::{EdgeId, GraphStore, NodeId, PropertyValue};
use crate::models::GraphValue;
use crate::traversal::{property_contains, OrderKey, Source, Step, Traversal};

/// Evaluation errors
#[derive(Error, Debug, PartialEq)]
pub enum EvalError {
    /// A step was applied to a traverser it cannot handle
    #[error("Type error: {0}")]
    TypeError(String),

    /// The traversal cannot be evaluated as written
    #[error("Invalid traversal: {0}")]
    InvalidTraversal(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

/// A traverser position
#[derive(Debug, Clone, PartialEq)]
enum Element {
    Vertex(NodeId),
    Edge(EdgeId),
    Value(PropertyValue),
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum DedupKey {
    Vertex(NodeId),
    Edge(EdgeId),
    Value(String),
}

/// Evaluates traversals against a borrowed store
pub struct TraversalEvaluator<'a> {
    store: &'a GraphStore,
}

impl<'a> TraversalEvaluator<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Evaluate a rooted traversal and materialize its output
    pub fn evaluate(&self, traversal: &Traversal) -> EvalResult<Vec<GraphValue>> {
        if traversal.source() == &Source::Anonymous {
            return Err(EvalError::InvalidTraversal(
                "anonymous traversal must be nested inside a rooted one".to_string(),
            ));
        }
        let output = self.run(Vec::new(), traversal)?;
        Ok(output.iter().map(|el| self.materialize(el)).collect())
    }

    fn start(&self, source: &Source, input: Vec<Element>) -> Vec<Element> {
        match source {
            Source::AllVertices => self
                .store
                .all_nodes()
                .into_iter()
                .map(|n| Element::Vertex(n.id))
                .collect(),
            // Unknown or malformed ids select nothing, as in Gremlin.
            Source::Vertices(ids) => ids
                .iter()
                .filter_map(|id| id.parse::<NodeId>().ok())
                .filter(|id| self.store.has_node(*id))
                .map(Element::Vertex)
                .collect(),
            Source::Anonymous => input,
        }
    }

    fn run(&self, input: Vec<Element>, traversal: &Traversal) -> EvalResult<Vec<Element>> {
        let mut stream = self.start(traversal.source(), input);
        for step in traversal.steps() {
            stream = self.apply(step, stream)?;
        }
        Ok(stream)
    }

    fn apply(&self, step: &Step, stream: Vec<Element>) -> EvalResult<Vec<Element>> {
        match step {
            Step::Out(label) => {
                let mut out = Vec::new();
                for el in &stream {
                    let id = self.vertex(el, "out")?;
                    out.extend(
                        self.store
                            .get_outgoing_edges(id)
                            .into_iter()
                            .filter(|e| e.edge_type.as_str() == label)
                            .map(|e| Element::Vertex(e.target)),
                    );
                }
                Ok(out)
            }
            Step::In(label) => {
                let mut out = Vec::new();
                for el in &stream {
                    let id = self.vertex(el, "in")?;
                    out.extend(
                        self.store
                            .get_incoming_edges(id)
                            .into_iter()
                            .filter(|e| e.edge_type.as_str() == label)
                            .map(|e| Element::Vertex(e.source)),
                    );
                }
                Ok(out)
            }
            Step::OutE(label) => {
                let mut out = Vec::new();
                for el in &stream {
                    let id = self.vertex(el, "outE")?;
                    out.extend(
                        self.store
                            .get_outgoing_edges(id)
                            .into_iter()
                            .filter(|e| e.edge_type.as_str() == label)
                            .map(|e| Element::Edge(e.id)),
                    );
                }
                Ok(out)
            }
            Step::Has(key, p) => self.retain(stream, |el| {
                Ok(self.property(el, key, "has")?.map_or(false, |v| p.test(v)))
            }),
            Step::HasKey(key) => self.retain(stream, |el| {
                Ok(self
                    .property(el, key, "has")?
                    .map_or(false, |v| !v.is_null()))
            }),
            Step::HasId(id) => Ok(stream
                .into_iter()
                .filter(|el| match el {
                    Element::Vertex(v) => v.to_string() == *id,
                    Element::Edge(e) => e.to_string() == *id,
                    Element::Value(_) => false,
                })
                .collect()),
            Step::Contains { key, value } => self.retain(stream, |el| {
                Ok(self
                    .property(el, key, "filter")?
                    .map_or(false, |v| property_contains(v, value)))
            }),
            Step::Where(sub) => {
                self.retain(stream, |el| Ok(!self.run(vec![el.clone()], sub)?.is_empty()))
            }
            Step::Not(sub) => {
                self.retain(stream, |el| Ok(self.run(vec![el.clone()], sub)?.is_empty()))
            }
            Step::Union(branches) => {
                let mut out = Vec::new();
                for branch in branches {
                    out.extend(self.run(stream.clone(), branch)?);
                }
                Ok(out)
            }
            Step::Dedup => {
                let mut seen = HashSet::new();
                Ok(stream
                    .into_iter()
                    .filter(|el| seen.insert(dedup_key(el)))
                    .collect())
            }
            Step::Count => Ok(vec![Element::Value(PropertyValue::Integer(
                stream.len() as i64,
            ))]),
            Step::Is(p) => Ok(stream
                .into_iter()
                .filter(|el| match el {
                    Element::Value(v) => p.test(v),
                    _ => false,
                })
                .collect()),
            Step::Limit(n) => Ok(stream.into_iter().take(*n).collect()),
            Step::Tail(n) => {
                let skip = stream.len().saturating_sub(*n);
                Ok(stream.into_iter().skip(skip).collect())
            }
            Step::Skip(n) => Ok(stream.into_iter().skip(*n).collect()),
            Step::Range(low, high) => Ok(stream
                .into_iter()
                .skip(*low)
                .take(high.saturating_sub(*low))
                .collect()),
            Step::Order(key) => self.order(stream, key),
            Step::Values(key) => {
                let mut out = Vec::new();
                for el in &stream {
                    if let Some(v) = self.property(el, key, "values")? {
                        out.push(Element::Value(v.clone()));
                    }
                }
                Ok(out)
            }
            Step::Id => stream
                .into_iter()
                .map(|el| match el {
                    Element::Vertex(v) => Ok(Element::Value(PropertyValue::String(v.to_string()))),
                    Element::Edge(e) => Ok(Element::Value(PropertyValue::String(e.to_string()))),
                    Element::Value(v) => Err(EvalError::TypeError(format!(
                        "id() applied to a {} value",
                        v.type_name()
                    ))),
                })
                .collect(),
        }
    }

    fn retain<F>(&self, stream: Vec<Element>, mut keep: F) -> EvalResult<Vec<Element>>
    where
        F: FnMut(&Element) -> EvalResult<bool>,
    {
        let mut out = Vec::with_capacity(stream.len());
        for el in stream {
            if keep(&el)? {
                out.push(el);
            }
        }
        Ok(out)
    }

    fn order(&self, stream: Vec<Element>, key: &OrderKey) -> EvalResult<Vec<Element>> {
        let mut keyed = Vec::with_capacity(stream.len());
        for el in stream {
            let sort_key = match key {
                OrderKey::Property(name) => self.property(&el, name, "order")?.cloned(),
                OrderKey::Traversal(sub) => {
                    match self.run(vec![el.clone()], sub)?.into_iter().next() {
                        Some(Element::Value(v)) => Some(v),
                        Some(Element::Vertex(id)) => Some(PropertyValue::Integer(id.as_u64() as i64)),
                        Some(Element::Edge(id)) => Some(PropertyValue::Integer(id.as_u64() as i64)),
                        None => None,
                    }
                }
            };
            if let Some(k) = sort_key {
                keyed.push((k, el));
            }
        }
        // Vec::sort_by is stable: ties keep store order.
        keyed.sort_by(|(a, _), (b, _)| sort_order(a, b));
        Ok(keyed.into_iter().map(|(_, el)| el).collect())
    }

    fn vertex(&self, el: &Element, step: &str) -> EvalResult<NodeId> {
        match el {
            Element::Vertex(id) => Ok(*id),
            other => Err(EvalError::TypeError(format!(
                "{}() expects a vertex, got {:?}",
                step, other
            ))),
        }
    }

    fn property(&self, el: &Element, key: &str, step: &str) -> EvalResult<Option<&'a PropertyValue>> {
        match el {
            Element::Vertex(id) => Ok(self.store.get_node(*id).and_then(|n| n.get_property(key))),
            Element::Edge(id) => Ok(self.store.get_edge(*id).and_then(|e| e.get_property(key))),
            Element::Value(v) => Err(EvalError::TypeError(format!(
                "{}('{}') expects an element, got a {} value",
                step,
                key,
                v.type_name()
            ))),
        }
    }

    fn materialize(&self, el: &Element) -> GraphValue {
        match el {
            Element::Vertex(id) => GraphValue::Vertex {
                id: id.to_string(),
                label: self
                    .store
                    .get_node(*id)
                    .map(|n| n.label.as_str().to_string())
                    .unwrap_or_default(),
            },
            Element::Edge(id) => GraphValue::Edge {
                id: id.to_string(),
                label: self
                    .store
                    .get_edge(*id)
                    .map(|e| e.edge_type.as_str().to_string())
                    .unwrap_or_default(),
            },
            Element::Value(v) => v.to_graph_value(),
        }
    }
}

fn dedup_key(el: &Element) -> DedupKey {
    match el {
        Element::Vertex(id) => DedupKey::Vertex(*id),
        Element::Edge(id) => DedupKey::Edge(*id),
        Element::Value(v) => DedupKey::Value(format!("{}:{}", v.type_name(), v)),
    }
}

fn type_rank(v: &PropertyValue) -> u8 {
    match v {
        PropertyValue::Null => 0,
        PropertyValue::Boolean(_) => 1,
        PropertyValue::Integer(_) | PropertyValue::Float(_) => 2,
        PropertyValue::String(_) => 3,
        PropertyValue::Array(_) => 4,
    }
}

/// Total order for sorting: natural order within comparable types, type rank
/// across them.
fn sort_order(a: &PropertyValue, b: &PropertyValue) -> Ordering {
    a.compare(b)
        .unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}
