//! Benchmark session
//!
//! A session owns one client, one configuration and (once sampled) one
//! [`Parameters`] value for its whole lifetime. Running it provisions
//! indexes, samples parameters once, drives every selected query through the
//! engine in library order, aggregates and writes the report, then closes
//! the client.

use indexmap::IndexMap;
use tracing::{info, warn};

use graphbench_sdk::{ElementType, GraphClient, IndexAdmin, RemoteClient};

use crate::config::SessionConfig;
use crate::engine::BenchmarkEngine;
use crate::error::{HarnessError, HarnessResult, Phase};
use crate::report::{aggregate, BenchmarkReport, ReportSettings, ReportWriter};
use crate::sampler::{ParameterSampler, Parameters};
use crate::workload::WorkloadLibrary;

/// Result of a completed session
#[derive(Debug)]
pub struct SessionOutcome {
    pub report: BenchmarkReport,
    /// Set when the report could not be written; the in-memory report is
    /// still complete.
    pub report_error: Option<HarnessError>,
}

pub struct BenchmarkSession<C: GraphClient + IndexAdmin> {
    client: C,
    config: SessionConfig,
    target: String,
    parameters: Option<Parameters>,
}

impl BenchmarkSession<RemoteClient> {
    /// Connect to the configured Gremlin Server
    pub async fn connect(config: SessionConfig) -> HarnessResult<Self> {
        config.validate()?;
        let options = config.connection.connect_options();
        let target = options.url();
        info!("connecting to {}", target);
        let client = RemoteClient::connect(options)
            .await
            .map_err(|source| HarnessError::Connection {
                phase: Phase::Setup,
                query: None,
                source,
            })?;
        Ok(Self {
            client,
            config,
            target,
            parameters: None,
        })
    }
}

impl<C: GraphClient + IndexAdmin> BenchmarkSession<C> {
    /// Wrap an already connected client
    pub fn with_client(client: C, config: SessionConfig) -> Self {
        Self {
            client,
            config,
            target: "embedded".to_string(),
            parameters: None,
        }
    }

    /// Label recorded in the report's settings
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Parameters sampled by this session, once it has sampled
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// Run the whole session. The client is closed afterwards whether the
    /// session completed or aborted.
    pub async fn run(&mut self, library: &WorkloadLibrary) -> HarnessResult<SessionOutcome> {
        let result = self.run_queries(library).await;
        if let Err(e) = self.client.close().await {
            warn!("failed to close client: {}", e);
        }
        if let Err(e) = &result {
            warn!("session aborted: {}", e.diagnostic());
        }
        result
    }

    async fn run_queries(&mut self, library: &WorkloadLibrary) -> HarnessResult<SessionOutcome> {
        self.config.validate()?;
        let selected = match &self.config.queries {
            Some(names) => library.select(names)?,
            None => library.clone(),
        };
        if selected.is_empty() {
            return Err(HarnessError::Config("no queries selected".to_string()));
        }

        self.provision_indexes().await?;
        let params = self.sample().await?;

        let options = self.config.engine_options();
        info!(
            "running {} queries against {} (warm-up {}, measure {})",
            selected.len(),
            self.target,
            options.warmup_iterations,
            options.measurement_iterations
        );
        let settings = ReportSettings {
            target: self.target.clone(),
            warmup_iterations: options.warmup_iterations,
            measurement_iterations: options.measurement_iterations,
            warmup_retries: options.warmup_retries,
            timeout_ms: options.timeout.as_millis() as u64,
        };

        let engine = BenchmarkEngine::new(&self.client, options);
        let mut results = IndexMap::with_capacity(selected.len());
        for def in selected.iter() {
            let run = engine.run(def, &params).await?;
            let ok = run.results.iter().filter(|r| r.is_success()).count();
            info!(
                "{}: {} ({}/{} iterations succeeded)",
                run.query,
                run.state,
                ok,
                run.results.len()
            );
            results.insert(run.query, run.results);
        }

        let report = aggregate(&results, settings, params);
        let report_error = match &self.config.output {
            Some(path) => match ReportWriter::write(&report, path) {
                Ok(()) => None,
                Err(e) => {
                    warn!("{}", e);
                    Some(e)
                }
            },
            None => None,
        };
        Ok(SessionOutcome {
            report,
            report_error,
        })
    }

    async fn provision_indexes(&self) -> HarnessResult<()> {
        for key in &self.config.indexes {
            self.client
                .create_index(ElementType::Vertex, key)
                .await
                .map_err(|source| {
                    if source.is_connection_error() {
                        HarnessError::Connection {
                            phase: Phase::Setup,
                            query: None,
                            source,
                        }
                    } else {
                        HarnessError::IndexProvisioning {
                            key: key.clone(),
                            source,
                        }
                    }
                })?;
            info!("index on '{}' ready", key);
        }
        Ok(())
    }

    /// Sample once; later calls reuse the first sample
    async fn sample(&mut self) -> HarnessResult<Parameters> {
        if let Some(params) = &self.parameters {
            return Ok(params.clone());
        }
        let mut sampler = ParameterSampler::new(&self.config.sampling);
        let params = sampler.sample(&self.client).await?;
        self.parameters = Some(params.clone());
        Ok(params)
    }
}
