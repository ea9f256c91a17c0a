use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sealnote_core::relay::SessionSweeper;
use sealnote_relay::{config::Config, create_router, state::AppState};

fn print_help() {
    eprintln!(
        r#"sealnote-relay - Sealnote remote unlock relay

USAGE:
    sealnote-relay [OPTIONS]

OPTIONS:
    -h, --help           Print this help

ENVIRONMENT VARIABLES:
    BIND_ADDRESS                  Listen address (default: 127.0.0.1:3000)
    SEALNOTE_MAX_SESSIONS         Live session limit (default: 1000)
    SEALNOTE_SWEEP_INTERVAL_SECS  Expired session sweep period (default: 30)
    RUST_LOG                      Log level (default: sealnote_relay=info)
"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sealnote_relay=info,sealnote_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let bind_address = config.bind_address;
    tracing::info!(
        max_sessions = config.max_sessions,
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "Starting sealnote relay on {}",
        bind_address
    );

    let state = Arc::new(AppState::new(config));
    let sweeper = SessionSweeper::start(
        Arc::clone(&state.sessions),
        state.config.sweep_interval,
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Relay listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.stop().await;
    tracing::info!("Relay stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Graceful shutdown initiated");
}
