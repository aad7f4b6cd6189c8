//! Envelope validation for incoming JSON-RPC messages.
//!
//! Turns a raw body into either a single request or a batch. Any failure is
//! reported as a [`ValidationFailure`] carrying the JSON-RPC error code and an
//! aggregated `field: constraint` message; no handler runs for a body that
//! fails here.

use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use super::protocol::{error_codes, Request, Response, JSONRPC_VERSION};

pub const MAX_BATCH_SIZE: usize = 100;

/// A body that passed envelope validation.
#[derive(Debug)]
pub enum Incoming {
    Single(Request),
    Batch(Vec<Request>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub code: i32,
    pub message: String,
}

impl ValidationFailure {
    fn parse(message: impl Into<String>) -> Self {
        Self {
            code: error_codes::PARSE_ERROR,
            message: message.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: error_codes::INVALID_REQUEST,
            message: message.into(),
        }
    }

    /// Envelope errors never know the id, so it is always `null`.
    pub fn into_response(self) -> Response {
        Response::error(Value::Null, self.code, self.message)
    }
}

/// Parses and validates a raw request body.
pub fn parse_message(body: &[u8]) -> Result<Incoming, ValidationFailure> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationFailure::parse(format!("Parse error: {}", e)))?;
    validate_message(value)
}

/// Validates an already parsed JSON value.
pub fn validate_message(value: Value) -> Result<Incoming, ValidationFailure> {
    match value {
        Value::Array(items) => validate_batch(items).map(Incoming::Batch),
        other => validate_single(other)
            .map(Incoming::Single)
            .map_err(|problems| {
                ValidationFailure::invalid(format!("Invalid Request: {}", problems.join("; ")))
            }),
    }
}

fn validate_batch(items: Vec<Value>) -> Result<Vec<Request>, ValidationFailure> {
    if items.is_empty() {
        return Err(ValidationFailure::invalid(
            "Invalid Request: batch must contain at least one request",
        ));
    }
    if items.len() > MAX_BATCH_SIZE {
        return Err(ValidationFailure::invalid(format!(
            "Invalid Request: batch contains {} requests, maximum is {}",
            items.len(),
            MAX_BATCH_SIZE
        )));
    }

    let mut requests = Vec::with_capacity(items.len());
    let mut problems = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match validate_single(item) {
            Ok(req) => requests.push(req),
            Err(errs) => problems.extend(errs.into_iter().map(|p| format!("[{}] {}", index, p))),
        }
    }

    if !problems.is_empty() {
        return Err(ValidationFailure::invalid(format!(
            "Invalid Request: {}",
            problems.join("; ")
        )));
    }
    Ok(requests)
}

fn validate_single(value: Value) -> Result<Request, Vec<String>> {
    let mut object = match value {
        Value::Object(object) => object,
        _ => return Err(vec!["request must be a JSON object".to_string()]),
    };

    let mut problems = member_type_problems(&mut object);
    let req: Request =
        serde_json::from_value(Value::Object(object)).map_err(|e| vec![e.to_string()])?;
    if let Err(errs) = req.validate() {
        problems.extend(describe(&errs));
    }

    if problems.is_empty() {
        Ok(req)
    } else {
        problems.sort();
        Err(problems)
    }
}

/// Reports missing or wrongly typed members by name and swaps in stand-ins,
/// so deserialization succeeds and the remaining rules still run.
fn member_type_problems(object: &mut Map<String, Value>) -> Vec<String> {
    let mut problems = Vec::new();

    for (field, stand_in) in [("jsonrpc", JSONRPC_VERSION), ("method", "invalid")] {
        match object.get(field) {
            Some(Value::String(_)) => continue,
            Some(_) => problems.push(format!("{}: must be a string", field)),
            None => problems.push(format!("{}: is required", field)),
        }
        object.insert(field.to_string(), Value::String(stand_in.to_string()));
    }

    if !matches!(object.get("params"), None | Some(Value::Null) | Some(Value::Object(_))) {
        problems.push("params: must be an object".to_string());
        object.remove("params");
    }

    problems
}

fn describe(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let constraint = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, constraint)
            })
        })
        .collect()
}
