//! Composable traversal expressions
//!
//! A [`Traversal`] is a source (all vertices, specific vertices, or the
//! incoming traverser for anonymous sub-traversals) followed by an ordered list
//! of [`Step`]s. The same value is rendered to Gremlin-Groovy for a remote
//! store ([`Traversal::to_gremlin`]) and interpreted directly by the embedded
//! store.
//!
//! ```rust
//! use graphbench_sdk::traversal::{anon, Traversal, P};
//!
//! let t = Traversal::v()
//!     .where_(anon().out("wrote").count().is(P::gte(2)))
//!     .values("name");
//! assert_eq!(
//!     t.to_gremlin(),
//!     "g.V().where(__.out('wrote').count().is(gte(2))).values('name')"
//! );
//! ```

mod gremlin;
mod predicate;

pub use predicate::{property_contains, P};

use serde::{Deserialize, Serialize};

/// How element ids are written into a rendered script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdFormat {
    /// The store's ids are `Long`s: integer ids render as `42L`, anything
    /// else is quoted
    #[default]
    Long,
    /// The store's ids are strings, even when they are all digits
    String,
}

/// Where a traversal starts
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// `g.V()`
    AllVertices,
    /// `g.V(id, ...)`
    Vertices(Vec<String>),
    /// `__`, starts from whatever traverser the enclosing step feeds in
    Anonymous,
}

/// Ordering key for `order().by(...)`
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKey {
    /// Value of a property on the element
    Property(String),
    /// First value produced by a sub-traversal started at the element
    Traversal(Box<Traversal>),
}

/// One step of a traversal
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Out(String),
    In(String),
    OutE(String),
    Has(String, P),
    HasKey(String),
    HasId(String),
    /// Keep elements whose multi-valued property contains the value
    Contains { key: String, value: String },
    Where(Box<Traversal>),
    Not(Box<Traversal>),
    Union(Vec<Traversal>),
    Dedup,
    Count,
    Is(P),
    Limit(usize),
    Tail(usize),
    Skip(usize),
    Range(usize, usize),
    Order(OrderKey),
    Values(String),
    Id,
}

/// A traversal expression
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    source: Source,
    steps: Vec<Step>,
}

/// Start an anonymous traversal (`__`)
pub fn anon() -> Traversal {
    Traversal::new(Source::Anonymous)
}

impl Traversal {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            steps: Vec::new(),
        }
    }

    /// `g.V()`
    pub fn v() -> Self {
        Self::new(Source::AllVertices)
    }

    /// `g.V(id)`
    pub fn v_id(id: impl Into<String>) -> Self {
        Self::new(Source::Vertices(vec![id.into()]))
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Append an arbitrary step
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn out(self, label: impl Into<String>) -> Self {
        self.step(Step::Out(label.into()))
    }

    pub fn in_(self, label: impl Into<String>) -> Self {
        self.step(Step::In(label.into()))
    }

    pub fn out_e(self, label: impl Into<String>) -> Self {
        self.step(Step::OutE(label.into()))
    }

    pub fn has(self, key: impl Into<String>, predicate: P) -> Self {
        self.step(Step::Has(key.into(), predicate))
    }

    pub fn has_key(self, key: impl Into<String>) -> Self {
        self.step(Step::HasKey(key.into()))
    }

    pub fn has_id(self, id: impl Into<String>) -> Self {
        self.step(Step::HasId(id.into()))
    }

    pub fn contains(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.step(Step::Contains {
            key: key.into(),
            value: value.into(),
        })
    }

    pub fn where_(self, condition: Traversal) -> Self {
        self.step(Step::Where(Box::new(condition)))
    }

    pub fn not(self, condition: Traversal) -> Self {
        self.step(Step::Not(Box::new(condition)))
    }

    pub fn union(self, branches: Vec<Traversal>) -> Self {
        self.step(Step::Union(branches))
    }

    pub fn dedup(self) -> Self {
        self.step(Step::Dedup)
    }

    pub fn count(self) -> Self {
        self.step(Step::Count)
    }

    pub fn is(self, predicate: P) -> Self {
        self.step(Step::Is(predicate))
    }

    pub fn limit(self, n: usize) -> Self {
        self.step(Step::Limit(n))
    }

    pub fn tail(self, n: usize) -> Self {
        self.step(Step::Tail(n))
    }

    pub fn skip(self, n: usize) -> Self {
        self.step(Step::Skip(n))
    }

    pub fn range(self, low: usize, high: usize) -> Self {
        self.step(Step::Range(low, high))
    }

    /// `order().by(sub)`
    pub fn order_by(self, key: Traversal) -> Self {
        self.step(Step::Order(OrderKey::Traversal(Box::new(key))))
    }

    /// `order().by('key')`
    pub fn order_by_key(self, key: impl Into<String>) -> Self {
        self.step(Step::Order(OrderKey::Property(key.into())))
    }

    pub fn values(self, key: impl Into<String>) -> Self {
        self.step(Step::Values(key.into()))
    }

    pub fn id(self) -> Self {
        self.step(Step::Id)
    }

    /// Render as a Gremlin-Groovy script for a store with `Long` ids
    pub fn to_gremlin(&self) -> String {
        self.to_gremlin_with(IdFormat::Long)
    }

    /// Render as a Gremlin-Groovy script with ids written per `ids`
    pub fn to_gremlin_with(&self, ids: IdFormat) -> String {
        gremlin::render(self, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_appends_in_order() {
        let t = Traversal::v_id("4").out("knownForTitle").dedup().values("primaryTitle");
        assert_eq!(t.source(), &Source::Vertices(vec!["4".to_string()]));
        assert_eq!(
            t.steps(),
            &[
                Step::Out("knownForTitle".to_string()),
                Step::Dedup,
                Step::Values("primaryTitle".to_string()),
            ]
        );
    }

    #[test]
    fn test_anonymous_source() {
        let t = anon().count();
        assert_eq!(t.source(), &Source::Anonymous);
        assert_eq!(t.steps(), &[Step::Count]);
    }
}
