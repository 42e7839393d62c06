use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::api::rest::tracking::DeliveryView;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WsQuery {
    pub order_id: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.order_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, order_id: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.delivery_events_tx.subscribe();

    info!(order_id = ?order_id, "websocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            let update = match rx.recv().await {
                Ok(update) => update,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging, updates dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if order_id
                .as_deref()
                .is_some_and(|wanted| wanted != update.order_id)
            {
                continue;
            }

            let json = match serde_json::to_string(&DeliveryView::from(update)) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize delivery update for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("websocket client disconnected");
}
