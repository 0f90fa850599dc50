use std::net::SocketAddr;

use clap::Parser;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use heimdash_config::{ConfigError, Settings};
use heimdash_core::{CoreError, Dashboard};

use heimdash::server::{self, AppState, PushCadence};

#[derive(Debug, Parser)]
#[command(name = "heimdash", about = "Home-dashboard backend", version)]
struct Cli {
    /// Listen port (overrides config and environment).
    #[arg(short, long)]
    port: Option<u16>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut settings = Settings::load()?;
    if let Some(port) = cli.port {
        settings.port = port;
    }

    let dashboard = Dashboard::new(settings.dashboard_config())?;
    // Populate every snapshot before accepting subscribers, so connecting
    // clients never see the empty defaults.
    dashboard.start().await;

    let state = AppState {
        dashboard: dashboard.clone(),
        wifi: std::sync::Arc::new(settings.wifi_access()),
        cadence: PushCadence::from_settings(&settings),
    };
    let app = server::router(state, settings.static_dir.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    dashboard.shutdown().await;
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    // Serve until interrupted; failure to install the handler would mean
    // running unstoppably, so that one is fatal.
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    info!("shutdown signal received");
}
