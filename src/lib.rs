use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod methods;
pub mod registry;
pub mod rpc;

use registry::MethodRegistry;

#[derive(Clone)]
pub struct AppState {
    pub api_token: Arc<str>,
    pub registry: Arc<MethodRegistry>,
}

impl AppState {
    pub fn new(api_token: String, registry: Arc<MethodRegistry>) -> Self {
        Self {
            api_token: Arc::<str>::from(api_token),
            registry,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/rpc/{entry_point}", post(http::handlers::rpc_endpoint))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ));

    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/.well-known/rpc", get(http::handlers::discovery))
        .merge(protected)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
