//! graphbench: latency benchmarks for parameterized Gremlin workloads
//!
//! A session samples query parameters once, runs every selected query of a
//! [`WorkloadLibrary`] through warm-up and measurement iterations, and writes
//! an aggregated [`BenchmarkReport`].
//!
//! # Components
//!
//! - [`sampler`]: draws entity ids and a time interval from the store
//! - [`workload`]: the eleven reference queries and their shared algebra
//! - [`engine`]: per-query iteration lifecycle and timing
//! - [`report`]: statistics and JSON output
//! - [`session`]: ties the above together around one client
//! - [`dataset`]: synthetic IMDb-shaped data for the embedded store
//!
//! ## Example Usage
//!
//! ```rust
//! use graphbench::{BenchmarkSession, SessionConfig, SyntheticDataset, WorkloadLibrary};
//! use graphbench::sdk::EmbeddedClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = EmbeddedClient::new();
//!     SyntheticDataset::default()
//!         .populate(&mut *client.store_write().await)
//!         .unwrap();
//!
//!     let mut config = SessionConfig::default();
//!     config.output = None;
//!     config.sampling.seed = Some(7);
//!
//!     let mut session = BenchmarkSession::with_client(client, config);
//!     let outcome = session.run(&WorkloadLibrary::standard()).await.unwrap();
//!     assert_eq!(outcome.report.queries.len(), 11);
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod report;
pub mod sampler;
pub mod session;
pub mod workload;

pub use graphbench_sdk as sdk;

pub use config::{ConnectionConfig, IntervalPolicy, SamplingConfig, SessionConfig};
pub use dataset::{DatasetBuilder, DatasetStats, SyntheticDataset};
pub use engine::{
    BenchmarkEngine, EngineOptions, FailureKind, IterationOutcome, IterationResult, QueryRun,
    QueryState,
};
pub use error::{HarnessError, HarnessResult, Phase};
pub use report::{
    aggregate, BenchmarkReport, LatencySummary, QueryReport, QueryStatus, ReportSettings,
    ReportWriter,
};
pub use sampler::{EntityKind, ParameterSampler, Parameters, TimeInterval};
pub use session::{BenchmarkSession, SessionOutcome};
pub use workload::{QueryDefinition, ResultShape, WorkloadLibrary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
