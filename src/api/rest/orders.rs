use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::order::{
    can_cancel_order, order_progress, Address, Order, OrderItem, OrderStatus, PaymentMethod,
};
use crate::orders::pricing::{quote, Quote};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/orders/:id/progress", get(get_order_progress))
        .route("/checkout/quote", post(checkout_quote))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub total_amount: f64,
    #[serde(default)]
    pub upi_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<OrderItem>,
}

#[derive(Serialize)]
pub struct ProgressResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub progress: f64,
    pub can_cancel: bool,
}

fn validate_items(items: &[OrderItem]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::BadRequest(
            "order must contain at least one item".to_string(),
        ));
    }

    for item in items {
        if item.name.trim().is_empty() {
            return Err(AppError::BadRequest("item name cannot be empty".to_string()));
        }
        if item.quantity == 0 {
            return Err(AppError::BadRequest(format!(
                "quantity for {} must be >= 1",
                item.name
            )));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(AppError::BadRequest(format!(
                "unit_price for {} must be >= 0",
                item.name
            )));
        }
    }

    Ok(())
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    validate_items(&payload.items)?;

    if !payload.total_amount.is_finite() || payload.total_amount < 0.0 {
        return Err(AppError::BadRequest(
            "total_amount must be >= 0".to_string(),
        ));
    }

    let upi_id = payload.upi_id.filter(|id| !id.trim().is_empty());
    if payload.payment_method == PaymentMethod::Upi && upi_id.is_none() {
        return Err(AppError::BadRequest(
            "upi_id is required for upi payments".to_string(),
        ));
    }

    let start = Instant::now();
    let created = state
        .orders
        .create_order(
            payload.items,
            payload.address,
            payload.payment_method,
            payload.total_amount,
            upi_id,
        )
        .await;
    state
        .metrics
        .observe_latency("create", start.elapsed().as_secs_f64());

    let outcome = if created.is_ok() { "success" } else { "error" };
    state
        .metrics
        .orders_created_total
        .with_label_values(&[outcome])
        .inc();

    let id = created?;
    load_order(&state, &id).await.map(Json)
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let status = query
        .status
        .ok_or_else(|| AppError::BadRequest("status query parameter is required".to_string()))?;

    let orders = state.orders.orders_by_status(status).await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let start = Instant::now();
    let order = load_order(&state, &id).await;
    state
        .metrics
        .observe_latency("get", start.elapsed().as_secs_f64());

    order.map(Json)
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.status == OrderStatus::Cancelled {
        return Err(AppError::BadRequest(
            "use POST /orders/:id/cancel to cancel an order".to_string(),
        ));
    }

    let start = Instant::now();
    let updated = state.orders.update_order_status(&id, payload.status).await;
    state
        .metrics
        .observe_latency("update_status", start.elapsed().as_secs_f64());
    updated?;

    state
        .metrics
        .order_status_updates_total
        .with_label_values(&[payload.status.as_str()])
        .inc();

    load_order(&state, &id).await.map(Json)
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let start = Instant::now();
    let cancelled = state.orders.cancel_order(&id).await;
    state
        .metrics
        .observe_latency("cancel", start.elapsed().as_secs_f64());

    let outcome = match &cancelled {
        Ok(()) => "cancelled",
        Err(AppError::InvalidTransition { .. }) => "rejected",
        Err(_) => "error",
    };
    state
        .metrics
        .order_cancellations_total
        .with_label_values(&[outcome])
        .inc();

    cancelled?;
    load_order(&state, &id).await.map(Json)
}

async fn get_order_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, AppError> {
    let order = load_order(&state, &id).await?;

    Ok(Json(ProgressResponse {
        status_label: order.status.label(),
        status_color: order.status.color(),
        progress: order_progress(&order.timeline),
        can_cancel: can_cancel_order(order.status),
        status: order.status,
        order_id: order.id,
    }))
}

async fn checkout_quote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<Quote>, AppError> {
    validate_items(&payload.items)?;

    Ok(Json(quote(
        &payload.items,
        state.delivery_fee,
        state.tax_amount,
    )))
}

async fn load_order(state: &AppState, id: &str) -> Result<Order, AppError> {
    state
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::OrderNotFound(id.to_string()))
}
