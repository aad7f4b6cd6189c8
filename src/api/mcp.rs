//! MCP over HTTP: `GET /api/mcp` opens the SSE stream, `POST /api/mcp`
//! carries JSON-RPC requests.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{CACHE_CONTROL, CONNECTION, HOST, RETRY_AFTER},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response, Sse},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::{
    mcp::{
        handler::{handle_incoming, Outgoing},
        protocol::{error_codes, Response as RpcResponse},
        session::session_events,
        validation::parse_message,
    },
    security::{build_endpoint_url, RateLimitResult},
    utils, AppState,
};

fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
}

fn with_rate_limit_headers(mut response: Response, limit: u32, result: &RateLimitResult) -> Response {
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(result.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(result.reset_at / 1000));
    response
}

/// Endpoint: GET /api/mcp
/// Opens an SSE stream announcing the callback URL, then pings until the
/// client disconnects.
pub async fn sse_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let raw_host = headers.get(HOST).and_then(|v| v.to_str().ok());
    let host = state.host_validator.validate(raw_host);
    let endpoint = build_endpoint_url(&host);

    let client = utils::client_key(forwarded_for(&headers));
    let session = state.sessions.open(&client);
    info!(session_id = %session.id(), %endpoint, "SSE connection opened");

    let events = session_events(
        session,
        endpoint,
        Duration::from_secs(state.config.sse_keepalive_secs),
        state.shutdown.clone(),
    );

    (
        [
            (CACHE_CONTROL, "no-cache, no-transform"),
            (CONNECTION, "keep-alive"),
        ],
        Sse::new(events),
    )
}

/// Endpoint: POST /api/mcp
/// Rate limits the caller, validates the body and dispatches it.
pub async fn message_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let client = utils::client_key(forwarded_for(&headers));
    let max_requests = state.rate_limiter.settings().max_requests;
    let limit = state.rate_limiter.check(&client);

    if !limit.allowed {
        let retry_after = state.rate_limiter.retry_after_secs(limit.reset_at);
        warn!(client = %client, retry_after, "rate limit exceeded");
        let body = RpcResponse::error_with_data(
            Value::Null,
            error_codes::RATE_LIMITED,
            "Rate limit exceeded. Retry after the number of seconds in the Retry-After header."
                .into(),
            json!({ "retryAfter": retry_after }),
        );
        let response = (
            StatusCode::TOO_MANY_REQUESTS,
            [(RETRY_AFTER, retry_after.to_string())],
            Json(body),
        )
            .into_response();
        return with_rate_limit_headers(response, max_requests, &limit);
    }

    let response = match parse_message(&body) {
        Err(failure) => {
            warn!(client = %client, code = failure.code, message = %failure.message, "rejected JSON-RPC envelope");
            (StatusCode::BAD_REQUEST, Json(failure.into_response())).into_response()
        }
        Ok(incoming) => match handle_incoming(incoming, &state) {
            Ok(Outgoing::Single(response)) => (StatusCode::OK, Json(response)).into_response(),
            Ok(Outgoing::Batch(responses)) => (StatusCode::OK, Json(responses)).into_response(),
            Ok(Outgoing::Nothing) => StatusCode::ACCEPTED.into_response(),
            Err(e) => {
                error!(client = %client, error = ?e, "internal error while handling MCP request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(RpcResponse::error(
                        Value::Null,
                        error_codes::INTERNAL_ERROR,
                        "Internal server error".into(),
                    )),
                )
                    .into_response()
            }
        },
    };

    with_rate_limit_headers(response, max_requests, &limit)
}
