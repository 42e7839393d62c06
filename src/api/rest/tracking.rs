use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::delivery::{DeliveryUpdate, GeoPoint};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/orders/:id/tracking",
            post(start_tracking).delete(stop_tracking),
        )
        .route("/orders/:id/tracking/reset", post(reset_tracking))
        .route("/orders/:id/delivery", get(get_delivery_update))
        .route("/route", get(get_route))
}

#[derive(Serialize)]
pub struct TrackingResponse {
    pub order_id: String,
    pub tracking: bool,
    pub interval_ms: u64,
}

#[derive(Serialize)]
pub struct DeliveryView {
    #[serde(flatten)]
    pub update: DeliveryUpdate,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub status_icon: &'static str,
}

impl From<DeliveryUpdate> for DeliveryView {
    fn from(update: DeliveryUpdate) -> Self {
        Self {
            status_label: update.status.label(),
            status_color: update.status.color(),
            status_icon: update.status.icon(),
            update,
        }
    }
}

#[derive(Serialize)]
pub struct RouteResponse {
    pub restaurant: GeoPoint,
    pub customer: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    pub length_km: f64,
}

/// Rewind the agent and push updates to WebSocket listeners on a timer.
async fn start_tracking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackingResponse>, AppError> {
    ensure_order_exists(&state, &id).await?;
    state.simulator.start_tracking(&id);

    let events_tx = state.delivery_events_tx.clone();
    let metrics = state.metrics.clone();
    let subscription =
        state
            .simulator
            .subscribe_with_interval(&id, state.tracking_interval, move |update| {
                metrics
                    .delivery_updates_total
                    .with_label_values(&[update.status.as_str()])
                    .inc();
                // no listeners is fine
                let _ = events_tx.send(update);
            });

    let pruned = state.prune_finished_subscriptions();
    if pruned > 0 {
        debug!(pruned, "finished delivery subscriptions removed");
    }

    // replacing a running subscription drops and cancels it
    if state.subscriptions.insert(id.clone(), subscription).is_some() {
        debug!(order_id = %id, "previous delivery subscription replaced");
    }
    info!(order_id = %id, "delivery tracking started");

    Ok(Json(TrackingResponse {
        order_id: id,
        tracking: true,
        interval_ms: state.tracking_interval.as_millis() as u64,
    }))
}

async fn stop_tracking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<TrackingResponse> {
    if let Some((_, mut subscription)) = state.subscriptions.remove(&id) {
        subscription.cancel();
        info!(order_id = %id, "delivery tracking stopped");
    }

    Json(TrackingResponse {
        order_id: id,
        tracking: false,
        interval_ms: state.tracking_interval.as_millis() as u64,
    })
}

async fn reset_tracking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackingResponse>, AppError> {
    ensure_order_exists(&state, &id).await?;
    state.simulator.reset_tracking(&id);
    info!(order_id = %id, "delivery tracking reset");

    Ok(Json(TrackingResponse {
        tracking: state
            .subscriptions
            .get(&id)
            .is_some_and(|entry| entry.value().is_active()),
        order_id: id,
        interval_ms: state.tracking_interval.as_millis() as u64,
    }))
}

async fn get_delivery_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeliveryView>, AppError> {
    ensure_order_exists(&state, &id).await?;
    Ok(Json(delivery_view(&state, &id)))
}

async fn get_route(State(state): State<Arc<AppState>>) -> Json<RouteResponse> {
    let simulator = &state.simulator;

    Json(RouteResponse {
        restaurant: simulator.restaurant_location(),
        customer: simulator.customer_location(),
        waypoints: simulator.route().to_vec(),
        length_km: simulator.route_length_km(),
    })
}

/// Cursors are only created for orders the store knows about.
async fn ensure_order_exists(state: &AppState, id: &str) -> Result<(), AppError> {
    match state.orders.get_order(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::OrderNotFound(id.to_string())),
    }
}

fn delivery_view(state: &AppState, id: &str) -> DeliveryView {
    let update = state.simulator.get_delivery_update(id);
    state
        .metrics
        .delivery_updates_total
        .with_label_values(&[update.status.as_str()])
        .inc();

    update.into()
}
