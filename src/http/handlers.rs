//! Axum HTTP handlers for the web server
//!
//! Provides the JSON-RPC endpoint per entry point, and general metadata
//! endpoints. The path segment of `/rpc/{entry_point}` is the entry-point
//! identifier fed to the resolver.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::rpc::server::handle_json_rpc_value;
use crate::rpc::wire::json_rpc_error;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub rpc_endpoint: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        rpc_endpoint: "/rpc/{entry_point}",
    })
}

pub async fn rpc_endpoint(
    State(state): State<AppState>,
    Path(entry_point): Path<String>,
    body: Bytes,
) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => {
            return (
                StatusCode::OK,
                Json(json_rpc_error(None, -32700, "Parse error")),
            )
                .into_response()
        }
    };

    if let Some(batch) = payload.as_array() {
        if batch.is_empty() {
            return (
                StatusCode::OK,
                Json(vec![json_rpc_error(None, -32600, "Invalid Request")]),
            )
                .into_response();
        }

        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = handle_json_rpc_value(&state, &entry_point, item.clone()).await
            {
                responses.push(response);
            }
        }

        if responses.is_empty() {
            return StatusCode::NO_CONTENT.into_response();
        }

        return (StatusCode::OK, Json(Value::Array(responses))).into_response();
    }

    match handle_json_rpc_value(&state, &entry_point, payload).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
