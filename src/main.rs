//! Deliberation admission service.
//!
//! Loads configuration, starts the pool monitor, and serves the admission
//! diagnostics endpoints behind the pool admission middleware.

use std::sync::Arc;

use axum::middleware;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use deliberation_admission::adapters::http::{
    admission_routes, pool_admission_middleware, AdmissionAppState,
};
use deliberation_admission::adapters::{PgPoolProbe, PoolStateMonitor};
use deliberation_admission::application::{install_global, AdmissionServices};
use deliberation_admission::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config)?;

    let addr = config.server.socket_addr()?;
    tracing::info!(
        environment = ?config.server.environment,
        %addr,
        "Starting deliberation admission service"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect_lazy(&config.database.url)?;

    let services = Arc::new(AdmissionServices::from_config(&config));
    install_global(services.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = PoolStateMonitor::with_interval(
        Arc::new(PgPoolProbe::new(pool.clone())),
        services.pool_degradation.clone(),
        config.database.probe_interval(),
    );
    let monitor_handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    let app = admission_routes(AdmissionAppState::new(services.clone()))
        .layer(middleware::from_fn_with_state(
            services.pool_degradation.clone(),
            pool_admission_middleware,
        ))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = monitor_handle.await {
        tracing::warn!(error = %e, "Pool monitor task failed");
    }
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if config.is_production() {
        builder.json().try_init()?;
    } else {
        builder.try_init()?;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
