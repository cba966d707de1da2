//! The standard query set
//!
//! Each builder is a pure function of the sampled [`Parameters`]. Dedup is
//! applied exactly where each query needs it; it is not normalized across
//! structurally similar queries.

use graphbench_sdk::{anon, Traversal, P};

use super::algebra::{credited_people, first_and_last, has_profession, select_extremal_by, Extremum};
use super::schema::*;
use super::{QueryDefinition, ResultShape};
use crate::sampler::Parameters;

/// Titles a given actor is known for
pub fn q1(p: &Parameters) -> Traversal {
    Traversal::v_id(p.actor_id.as_str())
        .out(KNOWN_FOR_TITLE)
        .values(PRIMARY_TITLE)
}

/// First and last known title of a given actor
pub fn q2(p: &Parameters) -> Traversal {
    first_and_last(Traversal::v_id(p.actor_id.as_str()).out(KNOWN_FOR_TITLE)).values(PRIMARY_TITLE)
}

/// Director with the most directing credits
pub fn q3(_: &Parameters) -> Traversal {
    select_extremal_by(
        has_profession(Traversal::v(), DIRECTOR),
        anon().out_e(DIRECTED).count(),
        Extremum::Most,
    )
    .values(NAME)
}

/// Director with the most directing credits inside the time interval
pub fn q4(p: &Parameters) -> Traversal {
    select_extremal_by(
        has_profession(Traversal::v(), DIRECTOR),
        anon()
            .out(DIRECTED)
            .has(START_YEAR, P::gte(p.time_interval.start_year))
            .has(END_YEAR, P::lte(p.time_interval.end_year))
            .count(),
        Extremum::Most,
    )
    .values(NAME)
}

/// Actor with the most distinct genres across known titles
pub fn q5(_: &Parameters) -> Traversal {
    select_extremal_by(
        has_profession(Traversal::v(), ACTOR),
        anon().out(KNOWN_FOR_TITLE).out(GENRE).dedup().count(),
        Extremum::Most,
    )
    .values(NAME)
}

/// Distinct actors sharing a known title with a given writer
pub fn q6(p: &Parameters) -> Traversal {
    has_profession(
        Traversal::v_id(p.writer_id.as_str())
            .out(WROTE)
            .in_(KNOWN_FOR_TITLE),
        ACTOR,
    )
    .dedup()
    .values(NAME)
}

/// Actors who never share a known title with a given writer
pub fn q7(p: &Parameters) -> Traversal {
    has_profession(Traversal::v(), ACTOR)
        .not(
            anon()
                .out(KNOWN_FOR_TITLE)
                .in_(WROTE)
                .has_id(p.writer_id.as_str()),
        )
        .values(NAME)
}

/// Writers with at least two writing credits
pub fn q8(_: &Parameters) -> Traversal {
    Traversal::v()
        .where_(anon().out(WROTE).count().is(P::gte(2)))
        .values(NAME)
}

/// Distinct people credited on a given title
pub fn q9(p: &Parameters) -> Traversal {
    credited_people(Traversal::v_id(p.movie_id.as_str()))
        .dedup()
        .values(NAME)
}

/// Title credited to the most distinct people
pub fn q10(_: &Parameters) -> Traversal {
    select_extremal_by(
        Traversal::v().has_key(PRIMARY_TITLE),
        credited_people(anon()).dedup().count(),
        Extremum::Most,
    )
    .values(PRIMARY_TITLE)
}

/// All titles in alphabetical order
pub fn q11(_: &Parameters) -> Traversal {
    Traversal::v()
        .has_key(PRIMARY_TITLE)
        .order_by_key(PRIMARY_TITLE)
        .values(PRIMARY_TITLE)
}

/// Definitions in registration order
pub fn standard_queries() -> Vec<QueryDefinition> {
    vec![
        QueryDefinition::new("Q1", "titles a given actor is known for", q1)
            .with_expected(ResultShape::Unbounded),
        QueryDefinition::new("Q2", "first and last known title of a given actor", q2)
            .with_expected(ResultShape::Bounded(2)),
        QueryDefinition::new("Q3", "director with the most directing credits", q3)
            .with_expected(ResultShape::Single),
        QueryDefinition::new(
            "Q4",
            "director with the most directing credits within a time interval",
            q4,
        )
        .with_expected(ResultShape::Single),
        QueryDefinition::new(
            "Q5",
            "actor with the most distinct genres across known titles",
            q5,
        )
        .with_expected(ResultShape::Single),
        QueryDefinition::new(
            "Q6",
            "distinct actors who share a known title with a given writer",
            q6,
        )
        .with_expected(ResultShape::Unbounded),
        QueryDefinition::new(
            "Q7",
            "actors who never share a known title with a given writer",
            q7,
        )
        .with_expected(ResultShape::Unbounded),
        QueryDefinition::new("Q8", "writers with at least 2 writing credits", q8)
            .with_expected(ResultShape::Unbounded),
        QueryDefinition::new("Q9", "distinct people credited on a given title", q9)
            .with_expected(ResultShape::Unbounded),
        QueryDefinition::new("Q10", "title credited to the most distinct people", q10)
            .with_expected(ResultShape::Single),
        QueryDefinition::new("Q11", "all titles ordered alphabetically", q11)
            .with_expected(ResultShape::Unbounded),
    ]
}
