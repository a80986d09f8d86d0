//! Built-in server methods
//!
//! Registered through the public registration path so they are subject to the
//! same conflict detection and listing as user methods.

use serde_json::json;

use crate::registry::{handler_fn, MethodBinding, MethodRegistry, RegistryError};

pub fn register_builtins(registry: &MethodRegistry) -> Result<(), RegistryError> {
    registry.register(MethodBinding::new(
        module_path!(),
        "ping",
        handler_fn(|_| Ok(json!("pong"))),
    ))?;

    registry.register(
        MethodBinding::new(
            module_path!(),
            "version",
            handler_fn(|_| Ok(json!(env!("CARGO_PKG_VERSION")))),
        )
        .named("server.version"),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::register_builtins;
    use crate::registry::{MethodRegistry, Protocol};

    #[test]
    fn builtins_are_listed_everywhere() {
        let registry = MethodRegistry::new();
        register_builtins(&registry).expect("builtins register");

        assert_eq!(
            registry.list_methods("main", Protocol::Json),
            vec!["ping".to_string(), "server.version".to_string()]
        );
        assert!(registry.get("ping", "admin", Protocol::Xml).is_some());
    }

    #[test]
    fn registering_builtins_twice_is_idempotent() {
        let registry = MethodRegistry::new();
        register_builtins(&registry).expect("first pass");
        register_builtins(&registry).expect("second pass is a no-op");

        assert_eq!(registry.len(), 2);
    }
}
