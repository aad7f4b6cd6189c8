//! # MCP Handler Module
//!
//! JSON-RPC method dispatch for the design catalog server. Both transports
//! (HTTP and stdio) hand validated requests to [`handle_incoming`].
//!
//! ## Supported Methods
//! - `initialize` - protocol handshake
//! - `notifications/initialized` - acknowledged without a response
//! - `tools/list` - the tool registry
//! - `tools/call` - run a tool against the catalog
//! - `ping` - liveness probe

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{
    error::McpError,
    mcp::{
        protocol::{error_codes, Request, Response, PROTOCOL_VERSION},
        validation::Incoming,
    },
    AppState,
};

pub const SERVER_NAME: &str = "design-catalog-mcp";

/// What a transport should send back.
#[derive(Debug, PartialEq)]
pub enum Outgoing {
    Single(Response),
    Batch(Vec<Response>),
    /// Only notifications were received.
    Nothing,
}

/// Dispatches a validated message.
pub fn handle_incoming(incoming: Incoming, state: &AppState) -> Result<Outgoing, McpError> {
    match incoming {
        Incoming::Single(req) => Ok(match handle_mcp_request(&req, state)? {
            Some(response) => Outgoing::Single(response),
            None => Outgoing::Nothing,
        }),
        Incoming::Batch(requests) => {
            let responses = handle_batch(&requests, state)?;
            if responses.is_empty() {
                Ok(Outgoing::Nothing)
            } else {
                Ok(Outgoing::Batch(responses))
            }
        }
    }
}

/// Runs every request in order; notifications contribute no entry.
pub fn handle_batch(requests: &[Request], state: &AppState) -> Result<Vec<Response>, McpError> {
    debug!(size = requests.len(), "handling batch");
    let mut responses = Vec::with_capacity(requests.len());
    for req in requests {
        if let Some(response) = handle_mcp_request(req, state)? {
            responses.push(response);
        }
    }
    Ok(responses)
}

/// This is the main dispatcher for a single request.
pub fn handle_mcp_request(req: &Request, state: &AppState) -> Result<Option<Response>, McpError> {
    info!(method = %req.method, id = ?req.id, "handling MCP request");

    if req.method == "notifications/initialized" || req.is_notification() {
        return Ok(None);
    }

    let id = req.response_id();
    let response = match req.method.as_str() {
        "initialize" => handle_initialize(id),
        "tools/list" => handle_tools_list(id, state),
        "tools/call" => handle_tool_call(id, req.params.as_ref(), state)?,
        "ping" => Response::success(id, json!({})),
        other => Response::error(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        ),
    };

    Ok(Some(response))
}

fn handle_initialize(id: Value) -> Response {
    Response::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "Design system catalog: look up UI patterns, web components and style-guide tokens, or generate a starter page."
        }),
    )
}

fn handle_tools_list(id: Value, state: &AppState) -> Response {
    Response::success(id, json!({ "tools": state.tools.definitions() }))
}

/// Handles a 'tools/call' request by dispatching it to the registry.
fn handle_tool_call(
    id: Value,
    params: Option<&Map<String, Value>>,
    state: &AppState,
) -> Result<Response, McpError> {
    let tool_name = match params.and_then(|p| p.get("name")).and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.trim(),
        _ => {
            return Ok(Response::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            ))
        }
    };

    let args = match params.and_then(|p| p.get("arguments")) {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Ok(Response::error(
                id,
                error_codes::INVALID_PARAMS,
                "'arguments' must be an object".into(),
            ))
        }
    };

    let result = state.tools.call(tool_name, &args, &state.catalog)?;
    if result.is_error() {
        info!(tool = tool_name, "tool returned an error result");
    }
    Ok(Response::success(id, serde_json::to_value(result)?))
}
