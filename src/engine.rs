//! Benchmark execution engine
//!
//! Runs one query through its warm-up and measurement phases:
//!
//! ```text
//! Idle -> WarmingUp(1..=W) -> Measuring(1..=M) -> Done | Failed
//! ```
//!
//! Iterations are strictly sequential. Only the execute call is timed;
//! building the traversal happens before the clock starts. Warm-up results
//! are discarded and never reach the report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use graphbench_sdk::{ClientError, GraphClient, GraphValue};

use crate::error::{HarnessError, HarnessResult, Phase};
use crate::sampler::Parameters;
use crate::workload::QueryDefinition;

/// Iteration counts and deadlines
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub warmup_iterations: usize,
    pub measurement_iterations: usize,
    /// Extra attempts for a warm-up iteration whose execution fails
    pub warmup_retries: usize,
    /// Per-call deadline
    pub timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            warmup_iterations: 3,
            measurement_iterations: 3,
            warmup_retries: 0,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Lifecycle of one query within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    WarmingUp(usize),
    Measuring(usize),
    Done,
    /// Every measured iteration failed
    Failed,
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryState::Idle => write!(f, "idle"),
            QueryState::WarmingUp(i) => write!(f, "warming-up({})", i),
            QueryState::Measuring(j) => write!(f, "measuring({})", j),
            QueryState::Done => write!(f, "done"),
            QueryState::Failed => write!(f, "failed"),
        }
    }
}

/// Why a measured iteration failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The store rejected or failed the traversal
    Execution,
    /// The call exceeded the per-call deadline
    Timeout,
    /// The result did not match the query's expected shape
    UnexpectedShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationOutcome {
    Success { cardinality: usize },
    Failure { kind: FailureKind, message: String },
}

/// One measured execution
#[derive(Debug, Clone, PartialEq)]
pub struct IterationResult {
    pub query: String,
    /// 1-based measurement index
    pub iteration: usize,
    pub elapsed: Duration,
    pub outcome: IterationOutcome,
}

impl IterationResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, IterationOutcome::Success { .. })
    }
}

/// Measured results of one query
#[derive(Debug, Clone)]
pub struct QueryRun {
    pub query: String,
    pub state: QueryState,
    pub results: Vec<IterationResult>,
}

enum Attempt {
    Ok(Vec<GraphValue>),
    TimedOut,
    Failed(ClientError),
}

/// Drives queries against a borrowed client
pub struct BenchmarkEngine<'a, C: GraphClient + ?Sized> {
    client: &'a C,
    options: EngineOptions,
}

impl<'a, C: GraphClient + ?Sized> BenchmarkEngine<'a, C> {
    pub fn new(client: &'a C, options: EngineOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Warm up, then measure, one iteration at a time
    pub async fn run(&self, def: &QueryDefinition, params: &Parameters) -> HarnessResult<QueryRun> {
        let mut state = QueryState::Idle;

        for i in 1..=self.options.warmup_iterations {
            transition(def, &mut state, QueryState::WarmingUp(i));
            self.warm_up(def, params, i).await?;
        }

        let mut results = Vec::with_capacity(self.options.measurement_iterations);
        for j in 1..=self.options.measurement_iterations {
            transition(def, &mut state, QueryState::Measuring(j));
            results.push(self.measure(def, params, j).await?);
        }

        let last = if !results.is_empty() && !results.iter().any(IterationResult::is_success) {
            QueryState::Failed
        } else {
            QueryState::Done
        };
        transition(def, &mut state, last);

        Ok(QueryRun {
            query: def.name().to_string(),
            state,
            results,
        })
    }

    async fn warm_up(&self, def: &QueryDefinition, params: &Parameters, i: usize) -> HarnessResult<()> {
        let attempts = self.options.warmup_retries + 1;
        for attempt in 1..=attempts {
            let traversal = def.traversal(params);
            let (elapsed, result) = self.timed(&traversal).await;
            match result {
                Attempt::Ok(values) => {
                    debug!(
                        "{} warm-up {}: {} values in {:?}",
                        def.name(),
                        i,
                        values.len(),
                        elapsed
                    );
                    return Ok(());
                }
                Attempt::TimedOut => {
                    return Err(HarnessError::WarmupTimeout {
                        query: def.name().to_string(),
                        timeout: self.options.timeout,
                    })
                }
                Attempt::Failed(e) if e.is_connection_error() => {
                    return Err(HarnessError::Connection {
                        phase: Phase::WarmUp,
                        query: Some(def.name().to_string()),
                        source: e,
                    })
                }
                Attempt::Failed(e) => {
                    warn!(
                        "{} warm-up {} attempt {}/{} failed: {}",
                        def.name(),
                        i,
                        attempt,
                        attempts,
                        e
                    );
                }
            }
        }
        Ok(())
    }

    async fn measure(
        &self,
        def: &QueryDefinition,
        params: &Parameters,
        j: usize,
    ) -> HarnessResult<IterationResult> {
        let traversal = def.traversal(params);
        let (elapsed, result) = self.timed(&traversal).await;
        let outcome = match result {
            Attempt::Ok(values) => match def.expected().map(|s| s.check(values.len())) {
                Some(Err(message)) => IterationOutcome::Failure {
                    kind: FailureKind::UnexpectedShape,
                    message,
                },
                _ => IterationOutcome::Success {
                    cardinality: values.len(),
                },
            },
            Attempt::TimedOut => IterationOutcome::Failure {
                kind: FailureKind::Timeout,
                message: format!("timed out after {:?}", self.options.timeout),
            },
            Attempt::Failed(e) if e.is_connection_error() => {
                return Err(HarnessError::Connection {
                    phase: Phase::Measurement,
                    query: Some(def.name().to_string()),
                    source: e,
                })
            }
            Attempt::Failed(e) => IterationOutcome::Failure {
                kind: FailureKind::Execution,
                message: e.to_string(),
            },
        };
        debug!("{} iteration {}: {:?} in {:?}", def.name(), j, outcome, elapsed);
        Ok(IterationResult {
            query: def.name().to_string(),
            iteration: j,
            elapsed,
            outcome,
        })
    }

    async fn timed(&self, traversal: &graphbench_sdk::Traversal) -> (Duration, Attempt) {
        let start = Instant::now();
        let result = tokio::time::timeout(self.options.timeout, self.client.execute(traversal)).await;
        let elapsed = start.elapsed();
        let attempt = match result {
            Err(_) => Attempt::TimedOut,
            Ok(Ok(values)) => Attempt::Ok(values),
            Ok(Err(e)) if e.is_timeout() => Attempt::TimedOut,
            Ok(Err(e)) => Attempt::Failed(e),
        };
        (elapsed, attempt)
    }
}

fn transition(def: &QueryDefinition, state: &mut QueryState, next: QueryState) {
    debug!("{}: {} -> {}", def.name(), state, next);
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::ResultShape;

    #[test]
    fn test_state_display() {
        assert_eq!(QueryState::WarmingUp(2).to_string(), "warming-up(2)");
        assert_eq!(QueryState::Measuring(1).to_string(), "measuring(1)");
        assert_eq!(QueryState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = IterationOutcome::Failure {
            kind: FailureKind::UnexpectedShape,
            message: ResultShape::Single.check(0).unwrap_err(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("unexpected_shape"));
        let back: IterationOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_default_options() {
        let options = EngineOptions::default();
        assert_eq!(options.warmup_iterations, 3);
        assert_eq!(options.measurement_iterations, 3);
        assert_eq!(options.warmup_retries, 0);
    }
}
