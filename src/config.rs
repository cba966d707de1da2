//! Session configuration
//!
//! Loaded from YAML; every field has a default so an empty document is a
//! valid configuration. Command-line flags override individual fields after
//! loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use graphbench_sdk::{ConnectOptions, IdFormat, DEFAULT_INDEX_PROCEDURE};

use crate::engine::EngineOptions;
use crate::error::{HarnessError, HarnessResult};
use crate::sampler::EntityKind;

/// How to reach the graph store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    /// HTTP path of the Gremlin endpoint
    pub path: String,
    /// Per-call deadline in milliseconds
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Admin procedure used to create secondary indexes
    pub index_procedure: String,
    /// Whether the store's element ids are `long` or `string`
    pub id_format: IdFormat,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8182,
            tls: false,
            path: "/".to_string(),
            timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
            index_procedure: DEFAULT_INDEX_PROCEDURE.to_string(),
            id_format: IdFormat::Long,
        }
    }
}

impl ConnectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            host: self.host.clone(),
            port: self.port,
            tls: self.tls,
            path: self.path.clone(),
            timeout: self.timeout(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            index_procedure: self.index_procedure.clone(),
            id_format: self.id_format,
        }
    }
}

/// Time interval policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum IntervalPolicy {
    /// Always use the given interval
    Fixed { start_year: i32, end_year: i32 },
    /// Draw `start` in `[min, max]`, then `end` in `[start, max]`
    Random { min_year: i32, max_year: i32 },
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        IntervalPolicy::Fixed {
            start_year: 1980,
            end_year: 2001,
        }
    }
}

/// Parameter sampling configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Seed for reproducible sampling; entropy when unset
    pub seed: Option<u64>,
    pub actor_id: Option<String>,
    pub director_id: Option<String>,
    pub writer_id: Option<String>,
    pub movie_id: Option<String>,
    pub time_interval: IntervalPolicy,
}

impl SamplingConfig {
    /// Configured identifier for an entity kind, if any
    pub fn fixed_id(&self, kind: EntityKind) -> Option<&str> {
        let id = match kind {
            EntityKind::Actor => &self.actor_id,
            EntityKind::Director => &self.director_id,
            EntityKind::Writer => &self.writer_id,
            EntityKind::Movie => &self.movie_id,
        };
        id.as_deref()
    }
}

/// Full configuration of one benchmark session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub connection: ConnectionConfig,
    pub warmup_iterations: usize,
    pub measurement_iterations: usize,
    /// Extra attempts for a warm-up execution that fails
    pub warmup_retries: usize,
    /// Report path; no report file is written when unset
    pub output: Option<PathBuf>,
    /// Restrict the run to these queries (all when unset)
    pub queries: Option<Vec<String>>,
    /// Vertex property keys to index before running
    pub indexes: Vec<String>,
    pub sampling: SamplingConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            warmup_iterations: 3,
            measurement_iterations: 3,
            warmup_retries: 0,
            output: Some(PathBuf::from("benchmark_report.json")),
            queries: None,
            indexes: Vec::new(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> HarnessResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| HarnessError::Config(format!("invalid YAML: {}", e)))
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| HarnessError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    /// Reject configurations that cannot produce a meaningful session
    pub fn validate(&self) -> HarnessResult<()> {
        if self.measurement_iterations == 0 {
            return Err(HarnessError::Config(
                "measurement_iterations must be at least 1".to_string(),
            ));
        }
        if self.connection.timeout_ms == 0 {
            return Err(HarnessError::Config(
                "connection.timeout_ms must be positive".to_string(),
            ));
        }
        if self.connection.port == 0 {
            return Err(HarnessError::Config(
                "connection.port must be positive".to_string(),
            ));
        }
        match self.sampling.time_interval {
            IntervalPolicy::Fixed {
                start_year,
                end_year,
            } if start_year > end_year => Err(HarnessError::Config(format!(
                "time interval start {} is after end {}",
                start_year, end_year
            ))),
            IntervalPolicy::Random { min_year, max_year } if min_year > max_year => {
                Err(HarnessError::Config(format!(
                    "time interval bounds [{}, {}] are inverted",
                    min_year, max_year
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            warmup_iterations: self.warmup_iterations,
            measurement_iterations: self.measurement_iterations,
            warmup_retries: self.warmup_retries,
            timeout: self.connection.timeout(),
        }
    }
}
