use std::sync::Arc;

use rpc_method_server::{
    build_app, config::Config, logging, methods, registry::MethodRegistry, AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let registry = Arc::new(MethodRegistry::new());
    methods::register_builtins(&registry)?;

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(config.api_token.clone(), registry.clone());
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        registered_methods = registry.len(),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
