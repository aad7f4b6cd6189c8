//! # API Module
//!
//! HTTP surface of the design catalog MCP server.
//!
//! ## Available Endpoints
//!
//! - `GET /api/health` - Liveness and catalog statistics
//! - `GET /api/mcp` - SSE stream; the first event names the JSON-RPC endpoint
//! - `POST /api/mcp` - JSON-RPC 2.0 requests, single or batched
//!
//! Every response carries permissive CORS headers and an `X-Request-Id`.

pub mod health;
pub mod mcp;

use axum::{
    http::{header::RETRY_AFTER, HeaderName, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Builds the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/mcp", get(mcp::sse_handler).post(mcp::message_handler));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static("x-request-id"),
            RETRY_AFTER,
            HeaderName::from_static("x-ratelimit-remaining"),
        ]);

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
