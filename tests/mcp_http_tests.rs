//! End-to-end tests for the MCP HTTP surface

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use std::io::Write;
use tower::ServiceExt;

use design_catalog_mcp::{
    api::create_router, catalog::Catalog, config::Config, mcp::protocol::error_codes, AppState,
};

fn test_state(config: Config) -> AppState {
    AppState::new(config, Catalog::embedded().unwrap())
}

fn create_test_app() -> Router {
    create_router(test_state(Config::default()))
}

fn post_request(body: Value) -> Request<Body> {
    post_raw(serde_json::to_vec(&body).unwrap())
}

fn post_raw(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/mcp")
        .header("Content-Type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

async fn call_tool(app: Router, name: &str, arguments: Value) -> Value {
    let (status, body) = send(
        app,
        post_request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "tool {} returned {}", name, body);
    body["result"].clone()
}

#[tokio::test]
async fn test_initialize_advertises_tools_capability() {
    let (status, body) = send(
        create_test_app(),
        post_request(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert!(body["result"]["capabilities"]["tools"].is_object());
    assert_eq!(body["result"]["serverInfo"]["name"], "design-catalog-mcp");
}

#[tokio::test]
async fn test_tools_list_describes_every_tool() {
    let (_, body) = send(
        create_test_app(),
        post_request(json!({"jsonrpc": "2.0", "id": "list", "method": "tools/list"})),
    )
    .await;

    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 14);
    for tool in tools {
        assert!(tool["name"].is_string());
        assert_eq!(tool["inputSchema"]["type"], "object");
    }
}

#[tokio::test]
async fn test_every_tool_answers_with_valid_arguments() {
    let cases = [
        ("list_patterns", json!({})),
        ("get_pattern", json!({"patternName": "Button"})),
        ("search_patterns", json!({"query": "button"})),
        ("get_pattern_examples", json!({"patternName": "card"})),
        ("get_style_guide", json!({})),
        ("get_style_guide", json!({"section": "colors"})),
        ("get_colors", json!({"category": "semantic"})),
        ("get_typography", json!({})),
        ("get_spacing", json!({})),
        ("get_breakpoints", json!({})),
        ("get_design_system_info", json!({})),
        ("list_components", json!({})),
        ("get_component", json!({"tagName": "lm-button"})),
        ("search_components", json!({"query": "button"})),
        ("generate_boilerplate", json!({"projectName": "Demo", "theme": "dark"})),
    ];

    let app = create_test_app();
    for (name, arguments) in cases {
        let result = call_tool(app.clone(), name, arguments).await;
        assert!(result.get("isError").is_none(), "{} failed: {}", name, result);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(!text.is_empty(), "{} returned empty text", name);
        assert_eq!(result["content"][0]["type"], "text");
    }
}

#[tokio::test]
async fn test_tool_failures_use_is_error() {
    let app = create_test_app();

    let unknown = call_tool(app.clone(), "does_not_exist", json!({})).await;
    assert_eq!(unknown["isError"], true);
    assert!(unknown["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("list_patterns"));

    let missing = call_tool(app.clone(), "get_pattern", json!({"patternName": "Carousel"})).await;
    assert_eq!(missing["isError"], true);
    assert!(missing["content"][0]["text"].as_str().unwrap().contains("Button"));

    let bad_enum = call_tool(app, "get_style_guide", json!({"section": "fonts"})).await;
    assert_eq!(bad_enum["isError"], true);
}

#[tokio::test]
async fn test_batch_preserves_order_and_drops_notifications() {
    let (status, body) = send(
        create_test_app(),
        post_request(json!([
            {"jsonrpc": "2.0", "id": 1, "method": "ping"},
            {"jsonrpc": "2.0", "method": "notifications/initialized"},
            {"jsonrpc": "2.0", "id": 2, "method": "tools/list"}
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let responses = body.as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
}

#[tokio::test]
async fn test_lone_notification_is_accepted_without_body() {
    let response = create_test_app()
        .oneshot(post_request(
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_oversized_batch_is_rejected() {
    let batch: Vec<Value> = (0..101)
        .map(|i| json!({"jsonrpc": "2.0", "id": i, "method": "ping"}))
        .collect();
    let (status, body) = send(create_test_app(), post_request(Value::Array(batch))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], error_codes::INVALID_REQUEST);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_malformed_json_is_a_parse_error() {
    let (status, body) = send(create_test_app(), post_raw("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], error_codes::PARSE_ERROR);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_invalid_envelope_is_rejected() {
    let (status, body) = send(
        create_test_app(),
        post_request(json!({"jsonrpc": "1.0", "id": 3, "method": "ping"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], error_codes::INVALID_REQUEST);
}

#[tokio::test]
async fn test_unknown_method_echoes_id() {
    let (status, body) = send(
        create_test_app(),
        post_request(json!({"jsonrpc": "2.0", "id": 7, "method": "frobnicate"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    assert_eq!(body["error"]["code"], error_codes::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    let config = Config {
        rate_limit_max_requests: 2,
        ..Config::default()
    };
    let app = create_router(test_state(config));
    let ping = || {
        Request::builder()
            .method(Method::POST)
            .uri("/api/mcp")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
            .unwrap()
    };

    for remaining in ["1", "0"] {
        let response = app.clone().oneshot(ping()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], remaining);
    }

    let response = app.clone().oneshot(ping()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], error_codes::RATE_LIMITED);

    // A different client has its own window
    let other = Request::builder()
        .method(Method::POST)
        .uri("/api/mcp")
        .header("x-forwarded-for", "198.51.100.4")
        .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
        .unwrap();
    let response = app.oneshot(other).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_cors_headers() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/mcp")
        .header("Origin", "https://example.org")
        .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
        .unwrap();
    let response = create_test_app().oneshot(request).await.unwrap();

    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_preflight_is_answered() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/mcp")
        .header("Origin", "https://example.org")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("access-control-allow-methods"));
}

async fn first_sse_frame(state: AppState, host: &str) -> String {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/mcp")
        .header("Host", host)
        .body(Body::empty())
        .unwrap();
    let response = create_router(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(response.headers()["cache-control"], "no-cache, no-transform");

    let mut stream = response.into_body().into_data_stream();
    let frame = stream.next().await.unwrap().unwrap();
    String::from_utf8(frame.to_vec()).unwrap()
}

#[tokio::test]
async fn test_sse_announces_local_endpoint() {
    let frame = first_sse_frame(test_state(Config::default()), "localhost:3000").await;

    assert!(frame.contains("event: endpoint"));
    assert!(frame.contains("data: http://localhost:3000/api/mcp"));
}

#[tokio::test]
async fn test_sse_replaces_untrusted_host() {
    let frame = first_sse_frame(test_state(Config::default()), "evil.example.com").await;

    assert!(frame.contains("data: https://lumen-design.vercel.app/api/mcp"));
    assert!(!frame.contains("evil"));
}

#[tokio::test]
async fn test_sse_accepts_preview_deployments() {
    let frame = first_sse_frame(
        test_state(Config::default()),
        "lumen-design-git-feature-team.vercel.app",
    )
    .await;

    assert!(frame.contains("https://lumen-design-git-feature-team.vercel.app/api/mcp"));
}

#[tokio::test]
async fn test_sse_session_is_released_on_disconnect() {
    let state = test_state(Config::default());
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/mcp")
        .header("Host", "localhost")
        .body(Body::empty())
        .unwrap();
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(state.sessions.active(), 1);

    drop(response);
    assert_eq!(state.sessions.active(), 0);
}

#[tokio::test]
async fn test_health_reports_counts() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tools"], 14);
    assert_eq!(body["activeSessions"], 0);
}

#[tokio::test]
async fn test_catalog_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "info": {{"name": "Test Kit", "version": "0.1.0", "description": "d",
                      "website": "https://example.org", "stylesheetUrl": "s", "scriptUrl": "j"}},
            "patterns": [
                {{"name": "Stepper", "category": "Navigation", "description": "Multi-step progress"}}
            ]
        }}"#
    )
    .unwrap();

    let catalog = Catalog::from_path(file.path()).unwrap();
    let app = create_router(AppState::new(Config::default(), catalog));

    let result = call_tool(app, "get_pattern", json!({"patternName": "stepper"})).await;
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Multi-step progress"));
}
