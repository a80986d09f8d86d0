//! JSON-RPC 2.0 surface over the registry

pub mod server;
pub mod wire;
