pub mod menu;
pub mod orders;
pub mod tracking;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(menu::router())
        .merge(orders::router())
        .merge(tracking::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    tracked_orders: usize,
    active_subscriptions: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        tracked_orders: state.simulator.tracked_orders(),
        active_subscriptions: state.active_subscriptions(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
