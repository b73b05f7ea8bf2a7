//! HTTP/WebSocket API for the blackjack server.
//!
//! The surface is deliberately small:
//!
//! - `GET /health` - liveness probe
//! - `GET /ws`     - WebSocket upgrade; one connection is one player
//!
//! Everything meaningful happens over the WebSocket as JSON events; see
//! [`blackjack::net::messages`] for the vocabulary.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::runtime::EngineHandle;

pub mod websocket;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
}

/// Build the router. CORS is permissive; browser clients connect from
/// wherever the static bundle is served.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
