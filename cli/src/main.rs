//! graphbench CLI: run the Gremlin workload benchmark from the command line
//!
//! Uses graphbench sessions over the SDK's RemoteClient, or over an
//! EmbeddedClient holding a synthetic dataset with `--embedded`.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use tracing::info;
use tracing_subscriber::EnvFilter;

use graphbench::{
    BenchmarkReport, BenchmarkSession, HarnessError, HarnessResult, IntervalPolicy, Parameters,
    QueryStatus, SessionConfig, SessionOutcome, SyntheticDataset, WorkloadLibrary,
};
use graphbench_sdk::{
    ElementType, EmbeddedClient, GraphClient, IdFormat, IndexAdmin, RemoteClient,
};

#[derive(Parser)]
#[command(name = "graphbench", version, about = "Latency benchmark for Gremlin graph workloads")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ElementArg {
    Vertex,
    Edge,
}

impl From<ElementArg> for ElementType {
    fn from(e: ElementArg) -> Self {
        match e {
            ElementArg::Vertex => ElementType::Vertex,
            ElementArg::Edge => ElementType::Edge,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum IdFormatArg {
    Long,
    String,
}

impl From<IdFormatArg> for IdFormat {
    fn from(f: IdFormatArg) -> Self {
        match f {
            IdFormatArg::Long => IdFormat::Long,
            IdFormatArg::String => IdFormat::String,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a benchmark session
    Run(RunArgs),
    /// List the workload queries
    List {
        /// Also render each query as Gremlin with placeholder parameters
        #[arg(long)]
        gremlin: bool,
    },
    /// Create a secondary index on the store
    Index {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Property key to index
        #[arg(long)]
        key: String,

        #[arg(long, value_enum, default_value = "vertex")]
        element: ElementArg,
    },
}

#[derive(Args)]
struct ConnectionArgs {
    /// Configuration file (YAML)
    #[arg(long, env = "GRAPHBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Gremlin Server host
    #[arg(long, env = "GRAPHBENCH_HOST")]
    host: Option<String>,

    /// Gremlin Server port
    #[arg(long, env = "GRAPHBENCH_PORT")]
    port: Option<u16>,

    /// Use TLS
    #[arg(long, env = "GRAPHBENCH_TLS")]
    tls: bool,

    /// Per-call timeout in milliseconds
    #[arg(long, env = "GRAPHBENCH_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Type of the store's element ids
    #[arg(long, value_enum)]
    id_format: Option<IdFormatArg>,
}

impl ConnectionArgs {
    fn load(&self) -> HarnessResult<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_yaml_file(path)?,
            None => SessionConfig::default(),
        };
        if let Some(host) = &self.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = self.port {
            config.connection.port = port;
        }
        if self.tls {
            config.connection.tls = true;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.connection.timeout_ms = timeout_ms;
        }
        if let Some(id_format) = self.id_format {
            config.connection.id_format = id_format.into();
        }
        Ok(config)
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Warm-up iterations per query
    #[arg(long)]
    warmup: Option<usize>,

    /// Measurement iterations per query
    #[arg(long)]
    measure: Option<usize>,

    /// Extra attempts for a failing warm-up iteration
    #[arg(long)]
    warmup_retries: Option<usize>,

    /// Only run these queries (repeatable)
    #[arg(long = "query")]
    queries: Vec<String>,

    /// Report path
    #[arg(long, env = "GRAPHBENCH_OUTPUT")]
    output: Option<PathBuf>,

    /// Do not write a report file
    #[arg(long, conflicts_with = "output")]
    no_output: bool,

    /// Seed for parameter sampling
    #[arg(long, env = "GRAPHBENCH_SEED")]
    seed: Option<u64>,

    #[arg(long)]
    actor_id: Option<String>,

    #[arg(long)]
    director_id: Option<String>,

    #[arg(long)]
    writer_id: Option<String>,

    #[arg(long)]
    movie_id: Option<String>,

    /// First year of the time interval
    #[arg(long)]
    start_year: Option<i32>,

    /// Last year of the time interval
    #[arg(long)]
    end_year: Option<i32>,

    /// Vertex property keys to index before running (repeatable)
    #[arg(long = "index")]
    indexes: Vec<String>,

    /// Run against an in-process synthetic dataset instead of a server
    #[arg(long)]
    embedded: bool,

    /// People in the synthetic dataset
    #[arg(long, default_value_t = 200)]
    people: usize,

    /// Titles in the synthetic dataset
    #[arg(long, default_value_t = 100)]
    titles: usize,

    /// Genres in the synthetic dataset
    #[arg(long, default_value_t = 10)]
    genres: usize,
}

impl RunArgs {
    fn session_config(&self) -> HarnessResult<SessionConfig> {
        let mut config = self.connection.load()?;
        if let Some(n) = self.warmup {
            config.warmup_iterations = n;
        }
        if let Some(n) = self.measure {
            config.measurement_iterations = n;
        }
        if let Some(n) = self.warmup_retries {
            config.warmup_retries = n;
        }
        if !self.queries.is_empty() {
            config.queries = Some(self.queries.clone());
        }
        if self.no_output {
            config.output = None;
        } else if let Some(path) = &self.output {
            config.output = Some(path.clone());
        }
        if self.seed.is_some() {
            config.sampling.seed = self.seed;
        }
        let ids = [
            (&self.actor_id, &mut config.sampling.actor_id),
            (&self.director_id, &mut config.sampling.director_id),
            (&self.writer_id, &mut config.sampling.writer_id),
            (&self.movie_id, &mut config.sampling.movie_id),
        ];
        for (flag, slot) in ids {
            if flag.is_some() {
                *slot = flag.clone();
            }
        }
        if self.start_year.is_some() || self.end_year.is_some() {
            let (start, end) = match config.sampling.time_interval {
                IntervalPolicy::Fixed {
                    start_year,
                    end_year,
                } => (start_year, end_year),
                IntervalPolicy::Random { min_year, max_year } => (min_year, max_year),
            };
            config.sampling.time_interval = IntervalPolicy::Fixed {
                start_year: self.start_year.unwrap_or(start),
                end_year: self.end_year.unwrap_or(end),
            };
        }
        config.indexes.extend(self.indexes.iter().cloned());
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run_benchmark(&args, &cli.format).await,
        Commands::List { gremlin } => run_list(gremlin, &cli.format),
        Commands::Index {
            connection,
            key,
            element,
        } => run_index(&connection, &key, element.into()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_benchmark(args: &RunArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let library = WorkloadLibrary::standard();
    let outcome = start_session(args, &library)
        .await
        .map_err(|e| anyhow!("session aborted: {}", e.diagnostic()))?;

    print_report(&outcome.report, format)?;
    if let Some(e) = &outcome.report_error {
        eprintln!("warning: {}", e);
    }
    let failed = outcome.report.failed_queries();
    if !failed.is_empty() {
        eprintln!("{} query(ies) failed every iteration: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

async fn start_session(args: &RunArgs, library: &WorkloadLibrary) -> HarnessResult<SessionOutcome> {
    let config = args.session_config()?;
    if args.embedded {
        let client = EmbeddedClient::new();
        let dataset = SyntheticDataset {
            people: args.people,
            titles: args.titles,
            genres: args.genres,
            seed: config.sampling.seed.unwrap_or(42),
        };
        dataset
            .populate(&mut *client.store_write().await)
            .map_err(|e| HarnessError::Config(format!("synthetic dataset: {}", e)))?;
        let session = BenchmarkSession::with_client(client, config).with_target("embedded");
        run_session(session, library).await
    } else {
        let session = BenchmarkSession::connect(config).await?;
        run_session(session, library).await
    }
}

async fn run_session<C: GraphClient + IndexAdmin>(
    mut session: BenchmarkSession<C>,
    library: &WorkloadLibrary,
) -> HarnessResult<SessionOutcome> {
    session.run(library).await
}

fn run_list(gremlin: bool, format: &OutputFormat) -> anyhow::Result<()> {
    let library = WorkloadLibrary::standard();
    let params = Parameters::placeholder();

    let rows: Vec<Vec<String>> = library
        .iter()
        .map(|def| {
            let mut row = vec![
                def.name().to_string(),
                def.expected()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                def.description().to_string(),
            ];
            if gremlin {
                row.push(def.traversal(&params).to_gremlin());
            }
            row
        })
        .collect();
    let mut header = vec!["Query", "Expected", "Description"];
    if gremlin {
        header.push("Gremlin");
    }

    match format {
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = rows
                .iter()
                .map(|row| {
                    let obj: serde_json::Map<String, serde_json::Value> = header
                        .iter()
                        .zip(row)
                        .map(|(h, v)| (h.to_lowercase(), serde_json::Value::String(v.clone())))
                        .collect();
                    serde_json::Value::Object(obj)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Csv => {
            println!("{}", header.join(","));
            for row in &rows {
                let cells: Vec<String> = row.iter().map(|c| format_csv_cell(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(header);
            for row in rows {
                table.add_row(row);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

async fn run_index(connection: &ConnectionArgs, key: &str, element: ElementType) -> anyhow::Result<()> {
    let config = connection.load()?;
    let options = config.connection.connect_options();
    let url = options.url();
    let client = RemoteClient::connect(options)
        .await
        .with_context(|| format!("connecting to {}", url))?;
    info!("connected to {}", url);
    client
        .create_index(element, key)
        .await
        .with_context(|| format!("creating {} index on '{}'", element, key))?;
    client.close().await?;
    println!("{} index on '{}' ready", element, key);
    Ok(())
}

fn print_report(report: &BenchmarkReport, format: &OutputFormat) -> anyhow::Result<()> {
    let header = [
        "Query", "Status", "Iterations", "Errors", "Min", "Mean", "p50", "p95", "Max",
    ];
    let rows: Vec<Vec<String>> = report
        .queries
        .iter()
        .map(|(name, q)| {
            let status = match q.status {
                QueryStatus::Completed => "completed",
                QueryStatus::Failed => "failed",
            };
            let mut row = vec![
                name.clone(),
                status.to_string(),
                q.iterations.to_string(),
                q.errors.to_string(),
            ];
            match &q.latency {
                Some(l) => row.extend(
                    [l.min_ns, l.mean_ns, l.p50_ns, l.p95_ns, l.max_ns]
                        .iter()
                        .map(|&ns| format_latency(ns)),
                ),
                None => row.extend(std::iter::repeat("-".to_string()).take(5)),
            }
            row
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", report.to_json()?);
        }
        OutputFormat::Csv => {
            println!("{}", header.join(","));
            for row in &rows {
                let cells: Vec<String> = row.iter().map(|c| format_csv_cell(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(header);
            for row in rows {
                table.add_row(row);
            }
            println!("{}", table);
            println!(
                "{} query(ies) against {}, parameters: actor={} director={} writer={} movie={} years={}..={}",
                report.queries.len(),
                report.settings.target,
                report.parameters.actor_id,
                report.parameters.director_id,
                report.parameters.writer_id,
                report.parameters.movie_id,
                report.parameters.time_interval.start_year,
                report.parameters.time_interval.end_year
            );
        }
    }
    Ok(())
}

/// Microseconds below 10 ms, milliseconds above
fn format_latency(ns: u64) -> String {
    let us = ns as f64 / 1_000.0;
    if us >= 10_000.0 {
        format!("{:.1} ms", us / 1_000.0)
    } else {
        format!("{:.1} µs", us)
    }
}

fn format_csv_cell(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
