use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use food_order_tracker::api;
use food_order_tracker::config::Config;
use food_order_tracker::error::AppError;
use food_order_tracker::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let shared_state = Arc::new(AppState::new(&config));
    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        tracking_interval_ms = config.tracking_interval.as_millis() as u64,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    let stopped = shared_state.subscriptions.len();
    shared_state.subscriptions.clear();
    tracing::info!(subscriptions = stopped, "delivery subscriptions stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
