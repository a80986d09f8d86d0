//! JSON-RPC 2.0 envelope helpers
//!
//! Provides standardized mapping of internal AppErrors to valid JSON-RPC
//! payloads.

use serde_json::{json, Value};

use crate::errors::AppError;

pub fn is_json_rpc_error(value: &Value) -> bool {
    value.get("error").is_some()
}

pub fn app_error_to_json_rpc(id: Option<Value>, err: AppError) -> Value {
    match err {
        AppError::BadRequest { code, message } => json_rpc_error_with_data(
            id,
            -32602,
            "Invalid params",
            Some(json!({
                "code": code,
                "message": message,
                "details": {}
            })),
        ),
        AppError::Unauthorized { code, message } => json_rpc_error_with_data(
            id,
            -32001,
            "Unauthorized",
            Some(json!({
                "code": code,
                "message": message,
                "details": {}
            })),
        ),
        AppError::Internal { .. } | AppError::Resolution { .. } => {
            json_rpc_error(id, -32603, "Internal error")
        }
        // Application faults keep the code and message the method raised.
        AppError::Fault { code, message } => json_rpc_error(id, code, &message),
    }
}

pub fn json_rpc_error(id: Option<Value>, code: i64, message: &str) -> Value {
    json_rpc_error_with_data(id, code, message, None)
}

pub fn json_rpc_error_with_data(
    id: Option<Value>,
    code: i64,
    message: &str,
    data: Option<Value>,
) -> Value {
    let mut error = json!({
        "code": code,
        "message": message
    });
    if let (Some(data), Some(error)) = (data, error.as_object_mut()) {
        error.insert("data".to_string(), data);
    }

    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error
    })
}

pub fn json_rpc_result(id: Option<Value>, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}
