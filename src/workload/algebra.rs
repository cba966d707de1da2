//! Reusable building blocks shared by several queries

use graphbench_sdk::{anon, Traversal};

use super::schema;

/// Keep vertices whose `professions` contain `profession`.
///
/// Evaluated by [`graphbench_sdk::property_contains`] on the embedded store
/// and by a `filter{}` closure on a remote one.
pub fn has_profession(traversal: Traversal, profession: &str) -> Traversal {
    traversal.contains(schema::PROFESSIONS, profession)
}

/// Which end of the ordering to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Most,
    Least,
}

/// Order `traversal` ascending by the value `key` derives for each element
/// and keep the single extremal element.
///
/// Ties keep the store's iteration order (the sort is stable), so `Most`
/// picks the last of the tied elements and `Least` the first.
pub fn select_extremal_by(traversal: Traversal, key: Traversal, extremum: Extremum) -> Traversal {
    let ordered = traversal.order_by(key);
    match extremum {
        Extremum::Most => ordered.tail(1),
        Extremum::Least => ordered.limit(1),
    }
}

/// First and last element of a stream. A single-element stream yields one
/// element, never the same one twice.
pub fn first_and_last(traversal: Traversal) -> Traversal {
    traversal.union(vec![anon().limit(1), anon().skip(1).tail(1)])
}

/// People credited on a title through any of the three credit relations
pub fn credited_people(traversal: Traversal) -> Traversal {
    traversal.union(vec![
        anon().in_(schema::KNOWN_FOR_TITLE),
        anon().in_(schema::DIRECTED),
        anon().in_(schema::WROTE),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_profession_renders_membership_filter() {
        let t = has_profession(Traversal::v(), schema::DIRECTOR);
        assert_eq!(
            t.to_gremlin(),
            "g.V().has('professions').filter{ it.get().values('professions').collectMany{ p -> \
             p instanceof Collection ? p : p.toString().split(',')*.trim() }\
             .contains('director') }"
        );
    }

    #[test]
    fn test_select_extremal() {
        let most = select_extremal_by(Traversal::v(), anon().out("wrote").count(), Extremum::Most);
        assert_eq!(
            most.to_gremlin(),
            "g.V().order().by(__.out('wrote').count()).tail(1)"
        );
        let least = select_extremal_by(Traversal::v(), anon().out("wrote").count(), Extremum::Least);
        assert!(least.to_gremlin().ends_with(".limit(1)"));
    }

    #[test]
    fn test_first_and_last() {
        assert_eq!(
            first_and_last(Traversal::v()).to_gremlin(),
            "g.V().union(__.limit(1), __.skip(1).tail(1))"
        );
    }
}
