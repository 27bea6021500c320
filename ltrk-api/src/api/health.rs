//! Health endpoint (no authentication)

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// Routes served without authentication
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "module": "ltrk-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
