//! HTTP/WebSocket API for the word duel server.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: async web framework for HTTP/WebSocket
//! - **Tower-http**: CORS middleware
//! - **Actor model**: room state managed by dedicated actor tasks
//!
//! # Modules
//!
//! - [`websocket`]: the duel protocol (create/join/start/answer/attack)
//! - [`upload`]: CSV word-list ingestion scoped to a room code
//!
//! # Endpoints
//!
//! ```text
//! GET  /health               - Server health status
//! GET  /ws                   - Establish WebSocket connection
//! POST /upload/{room_code}   - Upload a CSV word list for a room
//! ```
//!
//! CORS is configured permissively for the MVP client; tighten origins in
//! production.

pub mod upload;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use word_duel::RoomManager;

/// Application state shared across all HTTP handlers and WebSocket
/// connections. Cloned per request; cheap due to the Arc wrapper.
#[derive(Clone)]
pub struct AppState {
    pub room_manager: Arc<RoomManager>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .route("/upload/{room_code}", post(upload::upload_word_list))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","rooms":{"active_count":2},...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let active_count = state.room_manager.active_room_count().await;

    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": {
            "active_count": active_count,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
