//! JSON-RPC dispatch over the method registry
//!
//! Validates request envelopes, resolves methods against the registry for the
//! caller's entry point, and encodes invocation results or faults. The
//! `system.listMethods` introspection call is answered from the registry
//! listing directly.

use serde_json::{json, Value};
use tracing::info;

use crate::registry::{CallArgs, Protocol};
use crate::rpc::wire::{app_error_to_json_rpc, is_json_rpc_error, json_rpc_error, json_rpc_result};
use crate::AppState;

/// Protocol variant spoken by this HTTP surface. Methods constrained to
/// other variants are simply absent here.
pub const WIRE_PROTOCOL: Protocol = Protocol::Json;

pub const LIST_METHODS: &str = "system.listMethods";

pub async fn handle_json_rpc_value(
    state: &AppState,
    entry_point: &str,
    payload: Value,
) -> Option<Value> {
    if !payload.is_object() {
        return Some(json_rpc_error(None, -32600, "Invalid Request"));
    }

    let request_id = payload.get("id").cloned().filter(|id| !id.is_null());
    let is_notification = request_id.is_none();

    if payload.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Some(json_rpc_error(request_id, -32600, "Invalid Request"));
    }

    let method = payload
        .get("method")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|method| !method.is_empty());
    let Some(method) = method else {
        if is_notification {
            return None;
        }
        return Some(json_rpc_error(request_id, -32600, "Invalid Request"));
    };

    let params = payload.get("params").cloned();
    let response =
        handle_json_rpc_request(state, entry_point, request_id, method.to_string(), params).await;

    if is_notification {
        None
    } else {
        Some(response)
    }
}

pub async fn handle_json_rpc_request(
    state: &AppState,
    entry_point: &str,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
) -> Value {
    let response = match method.as_str() {
        LIST_METHODS => {
            let mut names = state.registry.list_methods(entry_point, WIRE_PROTOCOL);
            names.push(LIST_METHODS.to_string());
            names.sort();
            names.dedup();
            json_rpc_result(id, json!(names))
        }
        name => match state.registry.get(name, entry_point, WIRE_PROTOCOL) {
            None => json_rpc_error(id, -32601, "Method not found"),
            Some(descriptor) => match CallArgs::from_params(params) {
                Err(err) => app_error_to_json_rpc(id, err),
                Ok(args) => match state.registry.invoke(&descriptor, args).await {
                    Ok(result) => json_rpc_result(id, result),
                    Err(err) => app_error_to_json_rpc(id, err),
                },
            },
        },
    };

    info!(
        method = %method,
        entry_point = %entry_point,
        outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
        "rpc call audited"
    );

    response
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::handle_json_rpc_value;
    use crate::errors::AppError;
    use crate::registry::{handler_fn, CallArgs, MethodBinding, MethodRegistry, Protocol};
    use crate::AppState;

    fn state() -> AppState {
        let registry = MethodRegistry::new();
        registry
            .register(MethodBinding::new(
                "app::math",
                "square",
                handler_fn(|args: CallArgs| {
                    let x = args.positional.first().and_then(Value::as_i64).ok_or_else(
                        || AppError::bad_request("invalid_params", "expected one integer"),
                    )?;
                    Ok(json!(x * x))
                }),
            ))
            .expect("registers square");
        registry
            .register(
                MethodBinding::new("app::legacy", "export", handler_fn(|_| Ok(json!(null))))
                    .protocol(Protocol::Xml),
            )
            .expect("registers xml-only export");

        AppState::new("token-1234567890ab".to_string(), Arc::new(registry))
    }

    #[tokio::test]
    async fn dispatches_registered_method() {
        let response = handle_json_rpc_value(
            &state(),
            "main",
            json!({"jsonrpc": "2.0", "id": 1, "method": "square", "params": [4]}),
        )
        .await
        .expect("request yields a response");

        assert_eq!(response["result"], json!(16));
    }

    #[tokio::test]
    async fn unknown_method_is_not_found() {
        let response = handle_json_rpc_value(
            &state(),
            "main",
            json!({"jsonrpc": "2.0", "id": 2, "method": "missing"}),
        )
        .await
        .expect("request yields a response");

        assert_eq!(response["error"]["code"], json!(-32601));
    }

    #[tokio::test]
    async fn xml_only_method_is_absent_on_the_json_surface() {
        let response = handle_json_rpc_value(
            &state(),
            "main",
            json!({"jsonrpc": "2.0", "id": 3, "method": "export"}),
        )
        .await
        .expect("request yields a response");

        assert_eq!(response["error"]["code"], json!(-32601));
    }

    #[tokio::test]
    async fn list_methods_reflects_the_call_context() {
        let response = handle_json_rpc_value(
            &state(),
            "main",
            json!({"jsonrpc": "2.0", "id": 4, "method": "system.listMethods"}),
        )
        .await
        .expect("request yields a response");

        assert_eq!(response["result"], json!(["square", "system.listMethods"]));
    }

    #[tokio::test]
    async fn notification_produces_no_response() {
        let response = handle_json_rpc_value(
            &state(),
            "main",
            json!({"jsonrpc": "2.0", "method": "square", "params": [4]}),
        )
        .await;

        assert!(response.is_none());
    }

    #[tokio::test]
    async fn missing_jsonrpc_version_is_invalid() {
        let response = handle_json_rpc_value(&state(), "main", json!({"id": 5, "method": "square"}))
            .await
            .expect("request yields a response");

        assert_eq!(response["error"]["code"], json!(-32600));
    }

    #[tokio::test]
    async fn scalar_params_are_invalid_params() {
        let response = handle_json_rpc_value(
            &state(),
            "main",
            json!({"jsonrpc": "2.0", "id": 6, "method": "square", "params": 4}),
        )
        .await
        .expect("request yields a response");

        assert_eq!(response["error"]["code"], json!(-32602));
    }
}
