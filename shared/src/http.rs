use lambda_http::{http::StatusCode, Body, Error, Request, RequestExt, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ApiError;

/// Build a JSON response with the CORS header every route carries.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}

/// Render a handler outcome: the value on success, the error body otherwise.
pub fn respond<T: Serialize>(status: StatusCode, result: Result<T, ApiError>) -> Result<Response<Body>, Error> {
    match result {
        Ok(value) => json_response(status, &value),
        Err(e) => e.into_response(),
    }
}

pub fn preflight() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET,POST,PUT,DELETE,OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub fn not_found() -> Result<Response<Body>, Error> {
    json_response(StatusCode::NOT_FOUND, &serde_json::json!({"error": "Not found"}))
}

pub fn method_not_allowed() -> Result<Response<Body>, Error> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({"error": "Method not allowed"}),
    )
}

/// Parse a JSON request body.
pub fn parse_body<T: DeserializeOwned>(body: &Body) -> Result<T, ApiError> {
    let bytes: &[u8] = match body {
        Body::Text(text) => text.as_bytes(),
        Body::Binary(bytes) => bytes.as_slice(),
        Body::Empty => b"",
    };
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::error!("Failed to parse request body: {}", e);
        ApiError::BadRequest(format!("Invalid request body: {}", e))
    })
}

/// Optional query string parameter; empty values count as absent.
pub fn query_param(event: &Request, name: &str) -> Option<String> {
    event
        .query_string_parameters_ref()
        .and_then(|params| params.first(name))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

pub fn required_query_param(event: &Request, name: &str) -> Result<String, ApiError> {
    query_param(event, name)
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {} query parameter", name)))
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(event: &Request) -> Option<&str> {
    event
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
