//! Value predicates (`P`) and the multi-valued membership test

use std::cmp::Ordering;

use crate::graph::PropertyValue;

/// Comparison predicate used by `has(key, P)` and `is(P)`
#[derive(Debug, Clone, PartialEq)]
pub enum P {
    Eq(PropertyValue),
    Gt(PropertyValue),
    Gte(PropertyValue),
    Lt(PropertyValue),
    Lte(PropertyValue),
}

impl P {
    pub fn eq(value: impl Into<PropertyValue>) -> Self {
        P::Eq(value.into())
    }

    pub fn gt(value: impl Into<PropertyValue>) -> Self {
        P::Gt(value.into())
    }

    pub fn gte(value: impl Into<PropertyValue>) -> Self {
        P::Gte(value.into())
    }

    pub fn lt(value: impl Into<PropertyValue>) -> Self {
        P::Lt(value.into())
    }

    pub fn lte(value: impl Into<PropertyValue>) -> Self {
        P::Lte(value.into())
    }

    /// Gremlin name of the predicate
    pub fn name(&self) -> &'static str {
        match self {
            P::Eq(_) => "eq",
            P::Gt(_) => "gt",
            P::Gte(_) => "gte",
            P::Lt(_) => "lt",
            P::Lte(_) => "lte",
        }
    }

    /// Operand the candidate value is compared against
    pub fn operand(&self) -> &PropertyValue {
        match self {
            P::Eq(v) | P::Gt(v) | P::Gte(v) | P::Lt(v) | P::Lte(v) => v,
        }
    }

    /// Evaluate against a candidate value. Values of incomparable types never
    /// match.
    pub fn test(&self, candidate: &PropertyValue) -> bool {
        let Some(ord) = candidate.compare(self.operand()) else {
            return false;
        };
        match self {
            P::Eq(_) => ord == Ordering::Equal,
            P::Gt(_) => ord == Ordering::Greater,
            P::Gte(_) => ord != Ordering::Less,
            P::Lt(_) => ord == Ordering::Less,
            P::Lte(_) => ord != Ordering::Greater,
        }
    }
}

/// Membership test over a multi-valued property.
///
/// Arrays match when any string element equals `target`. Plain strings are
/// treated as comma-separated lists, which is how IMDb-style exports store
/// professions.
pub fn property_contains(value: &PropertyValue, target: &str) -> bool {
    match value {
        PropertyValue::Array(items) => items
            .iter()
            .any(|item| item.as_string().map_or(false, |s| s == target)),
        PropertyValue::String(s) => s.split(',').any(|part| part.trim() == target),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_predicates() {
        let year = PropertyValue::Integer(1995);
        assert!(P::gte(1980).test(&year));
        assert!(P::lte(2001).test(&year));
        assert!(!P::gt(1995).test(&year));
        assert!(P::eq(1995).test(&year));
        assert!(P::lt(1995.5).test(&year));
    }

    #[test]
    fn test_incomparable_types_never_match() {
        assert!(!P::gte(1980).test(&PropertyValue::String("1990".into())));
        assert!(!P::eq(1).test(&PropertyValue::Null));
    }

    #[test]
    fn test_property_contains() {
        let list = PropertyValue::Array(vec!["actor".into(), "writer".into()]);
        assert!(property_contains(&list, "actor"));
        assert!(!property_contains(&list, "director"));

        let csv = PropertyValue::String("director, producer".into());
        assert!(property_contains(&csv, "producer"));
        assert!(!property_contains(&csv, "actor"));

        assert!(!property_contains(&PropertyValue::Integer(3), "actor"));
    }
}
