//! Entry point for the `SafeSpeak` admin dashboard server
#![forbid(unsafe_code)]

use anyhow::Context;
use safespeak_core::{Config, init_logging};
use safespeak_web::{AppState, build_app};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    // Logging settings live in the configuration, so a load failure is reported before logging exists
    let config = Config::load().context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialise logging")?;

    info!("╔══════════════════════════════════════════════════════════╗");
    info!(
        "║          SafeSpeak Admin Dashboard v{:<20}║",
        env!("CARGO_PKG_VERSION")
    );
    info!("╚══════════════════════════════════════════════════════════╝");

    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server host '{}'", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    let state = AppState::from_config(config).context("failed to set up the backend")?;
    info!(
        fetcher = ?state.fetcher,
        sessions = ?state.sessions,
        "Backend ready"
    );
    let app = build_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!("🌐 Dashboard: http://{addr}/admin");
    info!("💚 Health:    http://{addr}/health");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received terminate signal, shutting down gracefully...");
        },
    }
}
