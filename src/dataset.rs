//! IMDb-shaped fixture data for the embedded store
//!
//! [`DatasetBuilder`] adds people, titles and genres with the labels and
//! property keys of [`crate::workload::schema`]; [`SyntheticDataset`] uses it
//! to generate a seeded random graph of a given size.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use tracing::info;

use graphbench_sdk::{EdgeId, GraphResult, GraphStore, NodeId, PropertyMap, PropertyValue};

use crate::workload::schema;

/// Adds workload-shaped vertices and edges to a store
pub struct DatasetBuilder<'a> {
    store: &'a mut GraphStore,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(store: &'a mut GraphStore) -> Self {
        Self { store }
    }

    /// A person with a (possibly empty) list of professions
    pub fn person(&mut self, name: &str, professions: &[&str]) -> NodeId {
        let mut props = PropertyMap::new();
        props.insert(schema::NAME.to_string(), name.into());
        props.insert(
            schema::PROFESSIONS.to_string(),
            PropertyValue::Array(professions.iter().map(|&p| p.into()).collect()),
        );
        self.store.create_node_with_properties(schema::PERSON, props)
    }

    /// A title running from `start_year` to `end_year`
    pub fn title(&mut self, primary_title: &str, start_year: i32, end_year: i32) -> NodeId {
        let mut props = PropertyMap::new();
        props.insert(schema::PRIMARY_TITLE.to_string(), primary_title.into());
        props.insert(schema::START_YEAR.to_string(), start_year.into());
        props.insert(schema::END_YEAR.to_string(), end_year.into());
        self.store.create_node_with_properties(schema::TITLE, props)
    }

    pub fn genre(&mut self, name: &str) -> NodeId {
        let mut props = PropertyMap::new();
        props.insert(schema::NAME.to_string(), name.into());
        self.store.create_node_with_properties(schema::GENRE_LABEL, props)
    }

    pub fn known_for(&mut self, person: NodeId, title: NodeId) -> GraphResult<EdgeId> {
        self.store.create_edge(person, title, schema::KNOWN_FOR_TITLE)
    }

    pub fn directed(&mut self, person: NodeId, title: NodeId) -> GraphResult<EdgeId> {
        self.store.create_edge(person, title, schema::DIRECTED)
    }

    pub fn wrote(&mut self, person: NodeId, title: NodeId) -> GraphResult<EdgeId> {
        self.store.create_edge(person, title, schema::WROTE)
    }

    pub fn has_genre(&mut self, title: NodeId, genre: NodeId) -> GraphResult<EdgeId> {
        self.store.create_edge(title, genre, schema::GENRE)
    }
}

const GENRE_NAMES: &[&str] = &[
    "Drama", "Comedy", "Thriller", "Romance", "Action", "Horror", "Documentary",
    "Crime", "Adventure", "Sci-Fi", "Family", "Western",
];

/// What a populate call created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatasetStats {
    pub people: usize,
    pub titles: usize,
    pub genres: usize,
    pub edges: usize,
}

/// Seeded random graph generator
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDataset {
    pub people: usize,
    pub titles: usize,
    pub genres: usize,
    pub seed: u64,
}

impl Default for SyntheticDataset {
    fn default() -> Self {
        Self {
            people: 200,
            titles: 100,
            genres: 10,
            seed: 42,
        }
    }
}

impl SyntheticDataset {
    /// Generate the graph into `store`.
    ///
    /// The first three people are an actor, a director and a writer, so
    /// every entity kind exists whenever `people >= 3` and `titles >= 1`.
    pub fn populate(&self, store: &mut GraphStore) -> GraphResult<DatasetStats> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut builder = DatasetBuilder::new(store);
        let mut stats = DatasetStats::default();

        let genres: Vec<NodeId> = (0..self.genres)
            .map(|i| {
                let base = GENRE_NAMES[i % GENRE_NAMES.len()];
                if i < GENRE_NAMES.len() {
                    builder.genre(base)
                } else {
                    builder.genre(&format!("{} {}", base, i / GENRE_NAMES.len() + 1))
                }
            })
            .collect();
        stats.genres = genres.len();

        let mut titles = Vec::with_capacity(self.titles);
        for i in 0..self.titles {
            let start: i32 = rng.gen_range(1950..=2020);
            let end = start + rng.gen_range(0..=2);
            let title = builder.title(&format!("Title {:04}", i), start, end);
            if !genres.is_empty() {
                let n = rng.gen_range(1..=3).min(genres.len());
                for g in sample(&mut rng, genres.len(), n).into_iter() {
                    builder.has_genre(title, genres[g])?;
                    stats.edges += 1;
                }
            }
            titles.push(title);
        }
        stats.titles = titles.len();

        for i in 0..self.people {
            let professions = match i {
                0 => vec![schema::ACTOR],
                1 => vec![schema::DIRECTOR],
                2 => vec![schema::WRITER],
                _ => random_professions(&mut rng),
            };
            let person = builder.person(&format!("Person {:04}", i), &professions);
            stats.people += 1;
            if titles.is_empty() {
                continue;
            }
            for profession in &professions {
                let (min, max) = match *profession {
                    schema::ACTOR => (1, 4),
                    _ => (1, 3),
                };
                let n = rng.gen_range(min..=max).min(titles.len());
                for t in sample(&mut rng, titles.len(), n).into_iter() {
                    match *profession {
                        schema::ACTOR => builder.known_for(person, titles[t])?,
                        schema::DIRECTOR => builder.directed(person, titles[t])?,
                        _ => builder.wrote(person, titles[t])?,
                    };
                    stats.edges += 1;
                }
            }
        }

        info!(
            "generated {} people, {} titles, {} genres, {} edges (seed {})",
            stats.people, stats.titles, stats.genres, stats.edges, self.seed
        );
        Ok(stats)
    }
}

/// Non-empty subset of the three credit professions, actor-heavy
fn random_professions(rng: &mut StdRng) -> Vec<&'static str> {
    let mut professions = Vec::new();
    if rng.gen_bool(0.6) {
        professions.push(schema::ACTOR);
    }
    if rng.gen_bool(0.25) {
        professions.push(schema::DIRECTOR);
    }
    if rng.gen_bool(0.3) {
        professions.push(schema::WRITER);
    }
    if professions.is_empty() {
        professions.push(schema::ACTOR);
    }
    professions
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphbench_sdk::{Label, TraversalEvaluator, Traversal};

    #[test]
    fn test_builder_shapes() {
        let mut store = GraphStore::new();
        let mut b = DatasetBuilder::new(&mut store);
        let ann = b.person("Ann", &["actor", "writer"]);
        let film = b.title("Metropolis", 1927, 1927);
        let drama = b.genre("Drama");
        b.known_for(ann, film).unwrap();
        b.wrote(ann, film).unwrap();
        b.has_genre(film, drama).unwrap();

        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 3);
        let node = store.get_node(ann).unwrap();
        assert_eq!(node.label, Label::new(schema::PERSON));
        assert_eq!(
            node.get_property(schema::PROFESSIONS),
            Some(&PropertyValue::from(vec!["actor", "writer"]))
        );
    }

    #[test]
    fn test_synthetic_is_reproducible() {
        let dataset = SyntheticDataset {
            people: 30,
            titles: 20,
            genres: 5,
            seed: 9,
        };
        let mut a = GraphStore::new();
        let mut b = GraphStore::new();
        let stats_a = dataset.populate(&mut a).unwrap();
        let stats_b = dataset.populate(&mut b).unwrap();
        assert_eq!(stats_a, stats_b);
        assert_eq!(stats_a.people, 30);
        assert_eq!(a.node_count(), 55);
        assert_eq!(a.edge_count(), stats_a.edges);

        let years = Traversal::v().has_key(schema::PRIMARY_TITLE).values(schema::START_YEAR);
        assert_eq!(
            TraversalEvaluator::new(&a).evaluate(&years).unwrap(),
            TraversalEvaluator::new(&b).evaluate(&years).unwrap()
        );
    }

    #[test]
    fn test_every_entity_kind_present() {
        let mut store = GraphStore::new();
        SyntheticDataset {
            people: 3,
            titles: 2,
            genres: 1,
            seed: 1,
        }
        .populate(&mut store)
        .unwrap();
        let eval = TraversalEvaluator::new(&store);
        for profession in [schema::ACTOR, schema::DIRECTOR, schema::WRITER] {
            let t = Traversal::v().contains(schema::PROFESSIONS, profession).count();
            let count = eval.evaluate(&t).unwrap()[0].as_i64().unwrap();
            assert!(count >= 1, "no {}", profession);
        }
    }

    #[test]
    fn test_empty_titles_skip_credits() {
        let mut store = GraphStore::new();
        let stats = SyntheticDataset {
            people: 5,
            titles: 0,
            genres: 0,
            seed: 1,
        }
        .populate(&mut store)
        .unwrap();
        assert_eq!(stats.edges, 0);
        assert_eq!(store.node_count(), 5);
    }
}
