//! Aggregation and reporting
//!
//! Latency statistics are computed over successful measured iterations only
//! and kept as integer nanoseconds, so writing a report to JSON and reading it
//! back yields an identical value.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::engine::{FailureKind, IterationOutcome, IterationResult};
use crate::error::{HarnessError, HarnessResult};
use crate::sampler::Parameters;

/// Settings a report was produced with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Where the queries ran (endpoint URL or `embedded`)
    pub target: String,
    pub warmup_iterations: usize,
    pub measurement_iterations: usize,
    pub warmup_retries: usize,
    pub timeout_ms: u64,
}

/// Latency summary over successful iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: usize,
    pub min_ns: u64,
    pub mean_ns: u64,
    pub max_ns: u64,
    pub p50_ns: u64,
    pub p95_ns: u64,
}

impl LatencySummary {
    /// Summarize samples; `None` when there are none
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let total: u128 = sorted.iter().map(|&s| s as u128).sum();
        Some(Self {
            count: sorted.len(),
            min_ns: sorted[0],
            mean_ns: (total / sorted.len() as u128) as u64,
            max_ns: sorted[sorted.len() - 1],
            p50_ns: percentile(&sorted, 50.0),
            p95_ns: percentile(&sorted, 95.0),
        })
    }
}

/// Nearest-rank percentile of sorted samples
pub fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (p * sorted.len() as f64 / 100.0).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Completed,
    /// Every measured iteration failed
    Failed,
}

/// Per-query section of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryReport {
    pub status: QueryStatus,
    /// Measured iterations (warm-up excluded)
    pub iterations: usize,
    pub successes: usize,
    pub errors: usize,
    pub latency: Option<LatencySummary>,
    /// Successful latencies in execution order
    pub samples_ns: Vec<u64>,
    pub failures: BTreeMap<FailureKind, usize>,
}

impl QueryReport {
    pub fn from_results(results: &[IterationResult]) -> Self {
        let mut samples_ns = Vec::with_capacity(results.len());
        let mut failures = BTreeMap::new();
        for result in results {
            match &result.outcome {
                IterationOutcome::Success { .. } => samples_ns.push(result.elapsed.as_nanos() as u64),
                IterationOutcome::Failure { kind, .. } => *failures.entry(*kind).or_insert(0) += 1,
            }
        }
        let successes = samples_ns.len();
        let status = if successes == 0 && !results.is_empty() {
            QueryStatus::Failed
        } else {
            QueryStatus::Completed
        };
        Self {
            status,
            iterations: results.len(),
            successes,
            errors: results.len() - successes,
            latency: LatencySummary::from_samples(&samples_ns),
            samples_ns,
            failures,
        }
    }
}

/// Aggregate over a whole session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_at: DateTime<Utc>,
    pub settings: ReportSettings,
    pub parameters: Parameters,
    /// Keyed by query name, in execution order
    pub queries: IndexMap<String, QueryReport>,
}

impl BenchmarkReport {
    /// Names of queries whose every measured iteration failed
    pub fn failed_queries(&self) -> Vec<&str> {
        self.queries
            .iter()
            .filter(|(_, q)| q.status == QueryStatus::Failed)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read a report written by [`ReportWriter`]
    pub fn from_json_file(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| HarnessError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
            .map_err(|e| HarnessError::Config(format!("{}: invalid report: {}", path.display(), e)))
    }
}

/// Build the report from measured results
pub fn aggregate(
    results: &IndexMap<String, Vec<IterationResult>>,
    settings: ReportSettings,
    parameters: Parameters,
) -> BenchmarkReport {
    let queries = results
        .iter()
        .map(|(name, runs)| (name.clone(), QueryReport::from_results(runs)))
        .collect();
    BenchmarkReport {
        generated_at: Utc::now(),
        settings,
        parameters,
        queries,
    }
}

/// Writes reports to disk
pub struct ReportWriter;

impl ReportWriter {
    /// Write pretty-printed JSON, creating parent directories
    pub fn write(report: &BenchmarkReport, path: impl AsRef<Path>) -> HarnessResult<()> {
        let path = path.as_ref();
        let serialization_error = |reason: String| HarnessError::ReportSerialization {
            path: path.to_path_buf(),
            reason,
        };

        let json = report.to_json().map_err(|e| serialization_error(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| serialization_error(e.to_string()))?;
        }
        std::fs::write(path, json).map_err(|e| serialization_error(e.to_string()))?;
        info!("report written to {}", path.display());
        Ok(())
    }
}
