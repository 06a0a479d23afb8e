//! Parley API server entry point.
//!
//! Binary name: `parley`
//!
//! Loads configuration, connects the stores, then either migrates the
//! database or serves the HTTP API until Ctrl+C or SIGTERM.

mod cli;
mod http;
mod state;

use std::net::SocketAddr;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use parley_infra::config::{apply_env_overrides, load_server_config};
use parley_infra::sqlite::pool::DatabasePool;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = load_server_config(cli.config.as_deref()).await;
    let mut config = apply_env_overrides(config, |name| std::env::var(name).ok());

    match cli.command {
        Commands::Migrate => {
            let pool = DatabasePool::new(&config.database_url).await?;
            pool.close().await;
            tracing::info!(database = %config.database_url, "database schema is up to date");
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let (state, pool) = AppState::init(&config).await?;

            let shutdown = CancellationToken::new();
            let sweeper = state
                .settings
                .rate_limit_enabled
                .then(|| state.limiter.start(shutdown.clone()));

            let addr = format!("{}:{}", config.host, config.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(
                %addr,
                environment = ?config.environment,
                rate_limit = state.settings.rate_limit_enabled,
                "parley API listening"
            );

            let router = http::router::build_router(state);
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await?;

            shutdown.cancel();
            if let Some(sweeper) = sweeper {
                if let Err(e) = sweeper.await {
                    tracing::warn!(error = %e, "rate limiter sweeper did not stop cleanly");
                }
            }
            pool.close().await;
            tracing::info!("server stopped");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
