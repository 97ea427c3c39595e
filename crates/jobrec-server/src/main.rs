//! JobRec Server
//!
//! Loads the job classification model once and serves recommendations
//! until SIGINT or SIGTERM.

use anyhow::Result;
use clap::Parser;
use jobrec_server::{build_router, cli::Cli, run_server, AppConfig, AppState};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting JobRec server");

    let config = AppConfig::load(&cli.config, &cli)?;
    let addr = config.server.socket_addr()?;
    info!("Model: {}", config.model.resolved_name());
    info!("Device: {}", config.model.device);

    let metrics_handle = init_metrics()?;

    // The model must be ready before the listener opens
    info!("Loading model...");
    let state = match AppState::load(config.model.clone(), metrics_handle).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to load model: {:#}", e);
            return Err(e);
        }
    };

    let router = build_router(state, config.server.max_body_bytes);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    run_server(router, addr, shutdown).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("jobrec=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobrec=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "jobrec_requests_total",
        "Total number of requests by endpoint"
    );
    metrics::describe_histogram!(
        "jobrec_inference_latency_us",
        metrics::Unit::Microseconds,
        "Tokenize, forward and rank latency in microseconds"
    );
    metrics::describe_counter!("jobrec_errors_total", "Total number of errors by kind");

    info!("Metrics exporter initialized");
    Ok(handle)
}
