//! Error taxonomy for benchmark sessions
//!
//! Every fatal error names the phase it happened in (and the query, when one
//! was running) so the CLI can print a single actionable diagnostic.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use graphbench_sdk::ClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session phase an error surfaced in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Sampling,
    WarmUp,
    Measurement,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Sampling => "sampling",
            Phase::WarmUp => "warm-up",
            Phase::Measurement => "measurement",
            Phase::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// Harness errors
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Invalid session configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A selected query name is not registered
    #[error("Unknown query: {0}")]
    UnknownQuery(String),

    /// No usable parameter could be drawn
    #[error("Sampling failed for {entity}: {reason}")]
    Sampling { entity: String, reason: String },

    /// The store became unreachable
    #[error("Connection failure during {phase}{}: {source}", for_query(.query))]
    Connection {
        phase: Phase,
        query: Option<String>,
        source: ClientError,
    },

    /// A warm-up execution exceeded the per-call deadline
    #[error("Query {query} timed out after {timeout:?} during warm-up")]
    WarmupTimeout { query: String, timeout: Duration },

    /// A configured secondary index could not be created
    #[error("Could not create index on '{key}': {source}")]
    IndexProvisioning { key: String, source: ClientError },

    /// The report could not be written (non-fatal)
    #[error("Could not write report to {}: {reason}", .path.display())]
    ReportSerialization { path: PathBuf, reason: String },
}

fn for_query(query: &Option<String>) -> String {
    match query {
        Some(q) => format!(" of {}", q),
        None => String::new(),
    }
}

impl HarnessError {
    /// Whether this error aborts the session
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HarnessError::ReportSerialization { .. })
    }

    /// Phase the error belongs to
    pub fn phase(&self) -> Phase {
        match self {
            HarnessError::Config(_)
            | HarnessError::UnknownQuery(_)
            | HarnessError::IndexProvisioning { .. } => Phase::Setup,
            HarnessError::Sampling { .. } => Phase::Sampling,
            HarnessError::Connection { phase, .. } => *phase,
            HarnessError::WarmupTimeout { .. } => Phase::WarmUp,
            HarnessError::ReportSerialization { .. } => Phase::Teardown,
        }
    }

    /// Query that was running, if any
    pub fn query(&self) -> Option<&str> {
        match self {
            HarnessError::Connection { query, .. } => query.as_deref(),
            HarnessError::WarmupTimeout { query, .. } => Some(query),
            HarnessError::UnknownQuery(name) => Some(name),
            _ => None,
        }
    }

    /// One-line diagnostic naming phase and query
    pub fn diagnostic(&self) -> String {
        match self.query() {
            Some(q) => format!("[{} phase, query {}] {}", self.phase(), q, self),
            None => format!("[{} phase] {}", self.phase(), self),
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
