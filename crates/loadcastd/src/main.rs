//! loadcastd — the Loadcast daemon.
//!
//! Assembles the model store, prediction pipeline, and HTTP API into one
//! process. The persisted model is loaded once, explicitly, before the
//! listener is bound.
//!
//! # Usage
//!
//! ```text
//! loadcastd serve --config /etc/loadcast/loadcast.toml --port 5000
//! loadcastd predict --input series.json --data-dir /var/lib/loadcast
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};

use loadcast_core::{LoadcastConfig, TimestampedSeries};
use loadcast_model::ModelStore;
use loadcast_predict::{PipelineSettings, PredictionPipeline};

#[derive(Parser)]
#[command(name = "loadcastd", about = "Loadcast request-load forecasting daemon")]
struct Cli {
    /// Path to loadcast.toml. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for persisted model artifacts (overrides config).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Serve predictions over HTTP.
    Serve {
        /// Address to bind (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one prediction against the persisted model and print it.
    Predict {
        /// JSON file with `timestamps` and `requestCounts`.
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let mut config = match &cli.config {
        Some(path) => LoadcastConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => LoadcastConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_serve(config).await
        }
        Command::Predict { input } => run_predict(config, &input).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,loadcastd=debug,loadcast=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Open the store under `data_dir`, build the pipeline, and load the
/// persisted model. A missing or unreadable model is not an error.
fn open_pipeline(config: &LoadcastConfig) -> anyhow::Result<PredictionPipeline> {
    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!("creating data dir {}", config.storage.data_dir.display())
    })?;
    let db_path = config.storage.db_path();

    let store = ModelStore::open(&db_path)?;
    info!(path = ?db_path, "model store opened");

    let settings = PipelineSettings::from(config);
    info!(
        training = ?settings.training,
        min_samples = settings.min_training_samples,
        horizon_minutes = settings.horizon_minutes,
        "prediction pipeline configured"
    );
    let pipeline = PredictionPipeline::new(store, settings)?;

    let loaded = pipeline.initialize();
    info!(loaded, "startup model load finished");
    Ok(pipeline)
}

async fn run_serve(config: LoadcastConfig) -> anyhow::Result<()> {
    info!("Loadcast daemon starting");

    let pipeline = Arc::new(
        tokio::task::spawn_blocking({
            let config = config.clone();
            move || open_pipeline(&config)
        })
        .await??,
    );

    let router = loadcast_api::build_router(Arc::clone(&pipeline));
    let ip = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid host {}", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);

    info!(%addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                return;
            }
            info!("shutdown signal received");
        })
        .await?;

    shutdown_pipeline(pipeline).await?;

    info!("Loadcast daemon stopped");
    Ok(())
}

/// Drain the training queue if this is the last handle to the pipeline.
/// Returns false, with a warning, when another handle is still alive.
async fn shutdown_pipeline(pipeline: Arc<PredictionPipeline>) -> anyhow::Result<bool> {
    match Arc::try_unwrap(pipeline) {
        Ok(pipeline) => {
            tokio::task::spawn_blocking(move || pipeline.shutdown()).await?;
            Ok(true)
        }
        Err(shared) => {
            warn!(
                handles = Arc::strong_count(&shared),
                "pipeline still shared at shutdown, training queue not drained"
            );
            Ok(false)
        }
    }
}

async fn run_predict(config: LoadcastConfig, input: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let series: TimestampedSeries = serde_json::from_str(&content)?;

    let result = tokio::task::spawn_blocking(move || {
        let pipeline = open_pipeline(&config)?;
        let result = pipeline.predict(&series);
        pipeline.shutdown();
        anyhow::Ok(result?)
    })
    .await??;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
