//! River projection API server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use granule_catalog::{CmrClient, GranuleFetcher};
use pixc_reader::{AnyPixelCloud, PixelCloudSource};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use river_api::build_router;
use river_api::config::ApiConfig;
use river_api::state::AppState;

/// River projection API server
#[derive(Parser, Debug)]
#[command(name = "river-api")]
#[command(about = "Projects SWOT pixel clouds onto river centerlines over HTTP")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8090", env = "RIVER_LISTEN_ADDR")]
    listen: String,

    /// Log filter directives; the flag takes precedence over RUST_LOG
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Service config file
    #[arg(long, default_value = "config/river-api.yaml", env = "RIVER_CONFIG")]
    config: PathBuf,

    /// Earthdata Login bearer token for granule downloads
    #[arg(long, env = "EARTHDATA_TOKEN", hide_env_values = true)]
    earthdata_token: Option<String>,

    /// Number of worker threads
    #[arg(long, env = "RIVER_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }
    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter = EnvFilter::new(&args.log_level);

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting river projection API");

    let config = ApiConfig::load(&args.config)?;

    if args.earthdata_token.is_none() {
        warn!("EARTHDATA_TOKEN not set, granule downloads will be unauthenticated");
    }
    let fetcher: Arc<dyn GranuleFetcher> = Arc::new(
        CmrClient::new(
            config.cmr.clone(),
            config.download.retry.clone(),
            args.earthdata_token.clone(),
            config.download.timeout(),
        )
        .context("Failed to build CMR client")?,
    );
    let source: Arc<dyn PixelCloudSource> = Arc::new(AnyPixelCloud);

    let prometheus = river_api::metrics::install_recorder()
        .context("Failed to install Prometheus recorder")?;
    let state = Arc::new(AppState::new(config, fetcher, source).with_prometheus(prometheus));

    let app = build_router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    info!("River API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
