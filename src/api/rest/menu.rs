use std::sync::Arc;

use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::models::menu::{MenuItem, FEATURED_ITEMS};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/menu", get(list_menu))
}

async fn list_menu() -> Json<&'static [MenuItem]> {
    Json(&FEATURED_ITEMS)
}
