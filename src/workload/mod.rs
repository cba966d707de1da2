//! Workload library: named, parameterized traversal definitions
//!
//! A [`QueryDefinition`] is a pure function from sampled [`Parameters`] to a
//! [`Traversal`] plus an optional expectation on the result size. The
//! [`WorkloadLibrary`] keeps definitions in registration order.

pub mod algebra;
pub mod queries;
pub mod schema;

use indexmap::IndexMap;
use std::fmt;

use graphbench_sdk::Traversal;

use crate::error::{HarnessError, HarnessResult};
use crate::sampler::Parameters;

/// Expected number of values a query emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Exactly one value
    Single,
    /// At most `n` values
    Bounded(usize),
    /// Any number of values
    Unbounded,
}

impl ResultShape {
    /// Check a result cardinality against the shape
    pub fn check(&self, cardinality: usize) -> Result<(), String> {
        match self {
            ResultShape::Single if cardinality != 1 => {
                Err(format!("expected exactly 1 value, got {}", cardinality))
            }
            ResultShape::Bounded(max) if cardinality > *max => {
                Err(format!("expected at most {} values, got {}", max, cardinality))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultShape::Single => write!(f, "single"),
            ResultShape::Bounded(n) => write!(f, "list(<= {})", n),
            ResultShape::Unbounded => write!(f, "list"),
        }
    }
}

/// A named query
#[derive(Debug, Clone)]
pub struct QueryDefinition {
    name: String,
    description: String,
    expected: Option<ResultShape>,
    build: fn(&Parameters) -> Traversal,
}

impl QueryDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        build: fn(&Parameters) -> Traversal,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected: None,
            build,
        }
    }

    pub fn with_expected(mut self, shape: ResultShape) -> Self {
        self.expected = Some(shape);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expected(&self) -> Option<ResultShape> {
        self.expected
    }

    /// Build the traversal for one execution
    pub fn traversal(&self, params: &Parameters) -> Traversal {
        (self.build)(params)
    }
}

/// Registry of query definitions, iterated in registration order
#[derive(Debug, Clone, Default)]
pub struct WorkloadLibrary {
    queries: IndexMap<String, QueryDefinition>,
}

impl WorkloadLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding Q1 through Q11
    pub fn standard() -> Self {
        let mut library = Self::new();
        for def in queries::standard_queries() {
            library.queries.insert(def.name.clone(), def);
        }
        library
    }

    /// Add a definition. Names must be unique.
    pub fn register(&mut self, def: QueryDefinition) -> HarnessResult<()> {
        if self.queries.contains_key(&def.name) {
            return Err(HarnessError::Config(format!(
                "query {} is already registered",
                def.name
            )));
        }
        self.queries.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&QueryDefinition> {
        self.queries.get(name)
    }

    /// Sub-library with the named queries, kept in library order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> HarnessResult<WorkloadLibrary> {
        for name in names {
            if !self.queries.contains_key(name.as_ref()) {
                return Err(HarnessError::UnknownQuery(name.as_ref().to_string()));
            }
        }
        let queries = self
            .queries
            .iter()
            .filter(|(name, _)| names.iter().any(|n| n.as_ref() == name.as_str()))
            .map(|(name, def)| (name.clone(), def.clone()))
            .collect();
        Ok(WorkloadLibrary { queries })
    }

    pub fn names(&self) -> Vec<&str> {
        self.queries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryDefinition> {
        self.queries.values()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
