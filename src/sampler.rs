//! Parameter sampling
//!
//! Draws the identifiers and the time interval every query of a session is
//! built from. Sampling runs once per session; the resulting [`Parameters`]
//! value is then shared read-only by every query.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use graphbench_sdk::{ClientError, GraphClient, GraphValue, Traversal};

use crate::config::{IntervalPolicy, SamplingConfig};
use crate::error::{HarnessError, HarnessResult, Phase};
use crate::workload::algebra::has_profession;
use crate::workload::schema;

/// Kind of entity a query parameter refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Actor,
    Director,
    Writer,
    Movie,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Actor,
        EntityKind::Director,
        EntityKind::Writer,
        EntityKind::Movie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Actor => "actor",
            EntityKind::Director => "director",
            EntityKind::Writer => "writer",
            EntityKind::Movie => "movie",
        }
    }

    /// Traversal selecting every vertex that may stand in for this kind
    pub fn candidates(&self) -> Traversal {
        match self {
            EntityKind::Actor => has_profession(Traversal::v(), schema::ACTOR),
            EntityKind::Director => has_profession(Traversal::v(), schema::DIRECTOR),
            EntityKind::Writer => has_profession(Traversal::v(), schema::WRITER),
            EntityKind::Movie => Traversal::v().has_key(schema::PRIMARY_TITLE),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start_year: i32,
    pub end_year: i32,
}

impl TimeInterval {
    pub fn new(start_year: i32, end_year: i32) -> HarnessResult<Self> {
        if start_year > end_year {
            return Err(HarnessError::Sampling {
                entity: "time interval".to_string(),
                reason: format!("start year {} is after end year {}", start_year, end_year),
            });
        }
        Ok(Self {
            start_year,
            end_year,
        })
    }
}

/// Sampled inputs shared by every query of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub actor_id: String,
    pub director_id: String,
    pub writer_id: String,
    pub movie_id: String,
    pub time_interval: TimeInterval,
}

impl Parameters {
    /// Identifier sampled for an entity kind
    pub fn id(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Actor => &self.actor_id,
            EntityKind::Director => &self.director_id,
            EntityKind::Writer => &self.writer_id,
            EntityKind::Movie => &self.movie_id,
        }
    }

    /// Named placeholders, for rendering queries without a store
    pub fn placeholder() -> Self {
        Self {
            actor_id: "<actor_id>".to_string(),
            director_id: "<director_id>".to_string(),
            writer_id: "<writer_id>".to_string(),
            movie_id: "<movie_id>".to_string(),
            time_interval: TimeInterval {
                start_year: 1980,
                end_year: 2001,
            },
        }
    }
}

/// Draws [`Parameters`] from a store
pub struct ParameterSampler {
    config: SamplingConfig,
    rng: StdRng,
}

impl ParameterSampler {
    pub fn new(config: &SamplingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config: config.clone(),
            rng,
        }
    }

    /// Sample one identifier per entity kind plus the time interval
    pub async fn sample<C: GraphClient + ?Sized>(&mut self, client: &C) -> HarnessResult<Parameters> {
        let actor_id = self.entity_id(client, EntityKind::Actor).await?;
        let director_id = self.entity_id(client, EntityKind::Director).await?;
        let writer_id = self.entity_id(client, EntityKind::Writer).await?;
        let movie_id = self.entity_id(client, EntityKind::Movie).await?;
        let time_interval = self.time_interval()?;

        let params = Parameters {
            actor_id,
            director_id,
            writer_id,
            movie_id,
            time_interval,
        };
        info!(
            "sampled parameters: actor={} director={} writer={} movie={} interval={}..={}",
            params.actor_id,
            params.director_id,
            params.writer_id,
            params.movie_id,
            params.time_interval.start_year,
            params.time_interval.end_year
        );
        Ok(params)
    }

    async fn entity_id<C: GraphClient + ?Sized>(
        &mut self,
        client: &C,
        kind: EntityKind,
    ) -> HarnessResult<String> {
        if let Some(id) = self.config.fixed_id(kind) {
            let id = id.to_string();
            let found = count(client, &Traversal::v_id(id.clone()).count(), kind).await?;
            if found == 0 {
                return Err(sampling_error(
                    kind,
                    format!("configured id '{}' does not exist in the store", id),
                ));
            }
            debug!("using configured {} id {}", kind, id);
            return Ok(id);
        }

        let total = count(client, &kind.candidates().count(), kind).await?;
        if total == 0 {
            return Err(sampling_error(kind, "no candidates in store".to_string()));
        }
        let offset = self.rng.gen_range(0..total) as usize;
        let picked = client
            .execute(&kind.candidates().range(offset, offset + 1).id())
            .await
            .map_err(|e| client_error(kind, e))?;
        let id = picked
            .first()
            .and_then(GraphValue::as_element_id)
            .ok_or_else(|| {
                sampling_error(kind, format!("no candidate at offset {} of {}", offset, total))
            })?;
        debug!("sampled {} id {} (offset {} of {})", kind, id, offset, total);
        Ok(id)
    }

    fn time_interval(&mut self) -> HarnessResult<TimeInterval> {
        match self.config.time_interval {
            IntervalPolicy::Fixed {
                start_year,
                end_year,
            } => TimeInterval::new(start_year, end_year),
            IntervalPolicy::Random { min_year, max_year } => {
                if min_year > max_year {
                    return Err(HarnessError::Sampling {
                        entity: "time interval".to_string(),
                        reason: format!("bounds [{}, {}] are inverted", min_year, max_year),
                    });
                }
                let start = self.rng.gen_range(min_year..=max_year);
                let end = self.rng.gen_range(start..=max_year);
                TimeInterval::new(start, end)
            }
        }
    }
}

async fn count<C: GraphClient + ?Sized>(
    client: &C,
    traversal: &Traversal,
    kind: EntityKind,
) -> HarnessResult<u64> {
    let values = client
        .execute(traversal)
        .await
        .map_err(|e| client_error(kind, e))?;
    values
        .first()
        .and_then(GraphValue::as_i64)
        .map(|n| n.max(0) as u64)
        .ok_or_else(|| sampling_error(kind, format!("count returned {:?}", values)))
}

fn sampling_error(kind: EntityKind, reason: String) -> HarnessError {
    HarnessError::Sampling {
        entity: kind.to_string(),
        reason,
    }
}

/// Connection failures keep their kind; anything else is a sampling failure.
fn client_error(kind: EntityKind, err: ClientError) -> HarnessError {
    if err.is_connection_error() {
        HarnessError::Connection {
            phase: Phase::Sampling,
            query: None,
            source: err,
        }
    } else {
        sampling_error(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_interval_ordering() {
        assert!(TimeInterval::new(1980, 2001).is_ok());
        assert!(TimeInterval::new(2001, 2001).is_ok());
        assert!(matches!(
            TimeInterval::new(2001, 1980),
            Err(HarnessError::Sampling { .. })
        ));
    }

    #[test]
    fn test_random_interval_within_bounds() {
        let config = SamplingConfig {
            seed: Some(11),
            time_interval: IntervalPolicy::Random {
                min_year: 1990,
                max_year: 1995,
            },
            ..Default::default()
        };
        let mut sampler = ParameterSampler::new(&config);
        for _ in 0..50 {
            let interval = sampler.time_interval().unwrap();
            assert!(interval.start_year >= 1990);
            assert!(interval.start_year <= interval.end_year);
            assert!(interval.end_year <= 1995);
        }
    }

    #[test]
    fn test_seeded_intervals_repeat() {
        let config = SamplingConfig {
            seed: Some(3),
            time_interval: IntervalPolicy::Random {
                min_year: 1900,
                max_year: 2020,
            },
            ..Default::default()
        };
        let a = ParameterSampler::new(&config).time_interval().unwrap();
        let b = ParameterSampler::new(&config).time_interval().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_candidate_traversals() {
        assert_eq!(
            EntityKind::Movie.candidates().to_gremlin(),
            "g.V().has('primaryTitle')"
        );
        assert!(EntityKind::Writer
            .candidates()
            .to_gremlin()
            .contains("contains('writer')"));
    }

    #[test]
    fn test_parameters_lookup() {
        let params = Parameters::placeholder();
        assert_eq!(params.id(EntityKind::Director), "<director_id>");
    }
}
