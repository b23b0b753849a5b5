use anyhow::Context;
use clap::Parser;
use pix_checkout::app::{config::Config, routes::router, state::build_state};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TRACKING_DRAIN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "pix-checkout", about = "PIX checkout backend")]
struct Args {
    /// TOML config file. Environment variables are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pix_checkout=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env(),
    };
    if let Some(port) = args.port {
        config.server_port = port;
    }

    info!("Starting PIX checkout server on port {}", config.server_port);

    let state = build_state(&config)?;
    let app = router(state.clone());

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.tracking().shutdown(TRACKING_DRAIN_GRACE).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
