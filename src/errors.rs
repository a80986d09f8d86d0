use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: &'static str,
    },
    #[error("unauthorized: {message}")]
    Unauthorized {
        code: &'static str,
        message: &'static str,
    },
    #[error("internal error")]
    Internal { code: &'static str, message: String },
    #[error("cannot resolve handler for method {name}")]
    Resolution { name: String },
    #[error("method fault {code}: {message}")]
    Fault { code: i64, message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: &'static str) -> Self {
        Self::BadRequest { code, message }
    }

    pub fn unauthorized(code: &'static str, message: &'static str) -> Self {
        Self::Unauthorized { code, message }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
        }
    }

    pub fn resolution(name: impl Into<String>) -> Self {
        Self::Resolution { name: name.into() }
    }

    /// Application-level RPC fault raised by a registered method; carried
    /// through dispatch without translation.
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        Self::Fault {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => (
                StatusCode::BAD_REQUEST,
                code.to_string(),
                message.to_string(),
            ),
            Self::Unauthorized { code, message } => (
                StatusCode::UNAUTHORIZED,
                code.to_string(),
                message.to_string(),
            ),
            Self::Internal { code, message } => {
                tracing::error!(error = %message, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code.to_string(),
                    "internal server error".to_string(),
                )
            }
            Self::Resolution { name } => {
                tracing::error!(method = %name, "registered method has no live handler");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "resolution_error".to_string(),
                    "internal server error".to_string(),
                )
            }
            Self::Fault { code, message } => {
                (StatusCode::BAD_REQUEST, format!("fault_{code}"), message)
            }
        };

        (
            status,
            Json(ErrorResponse {
                code,
                message,
                details: json!({}),
            }),
        )
            .into_response()
    }
}
