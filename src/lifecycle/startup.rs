//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Install the metrics exporter when enabled
//! - Bind the sample application's routes
//! - Bind the listener last, so traffic arrives only when ready

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::{route_defs, AppServer, AppSettings, MockBackend};
use crate::config::validation::validate_config;
use crate::config::{ConfigError, ServerConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::router::AxumRouter;

/// Bind every application route into a fresh axum router.
pub fn build_routes(config: &ServerConfig, backend: Arc<MockBackend>) -> anyhow::Result<AxumRouter> {
    let app = AppServer::new(route_defs()?, backend, AppSettings::from_config(config));
    let mut routes = AxumRouter::new();
    app.add_routes(&mut routes, &config.routes.prefix)?;
    tracing::info!(routes = routes.len(), prefix = %config.routes.prefix, "Routes bound");
    Ok(routes)
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn start(config: ServerConfig) -> anyhow::Result<()> {
    start_until(config, shutdown_signal()).await
}

pub async fn start_until<S>(config: ServerConfig, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .context("Failed to parse metrics address")?;
        metrics::init_metrics(addr);
    }

    let routes = build_routes(&config, Arc::new(MockBackend::seeded()))?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.listener.bind_address))?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(config, routes).run_until(listener, shutdown).await?;
    Ok(())
}
