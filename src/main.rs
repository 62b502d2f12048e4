mod api;
mod config;
mod marketplace;
mod state;
mod ui;
mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Arc::new(AppConfig::load().context("failed to load configuration")?);
    match &config.config_path {
        Some(path) => info!("loaded configuration from {}", path.display()),
        None => info!("no config file found; using defaults and environment"),
    }
    for (service, url) in [
        ("recommendation", &config.recommend_url),
        ("detection", &config.detect_url),
        ("weather", &config.weather_url),
    ] {
        if url.trim().is_empty() {
            warn!("{service} upstream is not configured; its API route will answer 503");
        }
    }

    let state = Arc::new(AppState::new(config.clone()).context("failed to build app state")?);

    let frontend_dist = config.frontend_dist();
    let app = if frontend_dist.exists() {
        info!("serving frontend assets from {}", frontend_dist.display());
        api::router(state).nest_service("/assets", ServeDir::new(frontend_dist))
    } else {
        warn!(
            "frontend dist missing at {}; /assets will not be served",
            frontend_dist.display()
        );
        api::router(state)
    };

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_addr))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("cropwise listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
