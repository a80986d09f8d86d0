//! Handler seam and invocation path
//!
//! Registered methods implement [`RpcHandler`]; dispatch re-acquires the live
//! handler from the registry by external name and runs it without holding any
//! registry lock. Handler errors propagate to the caller unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::registry::descriptor::MethodDescriptor;
use crate::registry::store::MethodRegistry;

/// Positional and keyword arguments supplied by the request layer.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub named: Map<String, Value>,
}

impl CallArgs {
    pub fn positional(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: Map::new(),
        }
    }

    pub fn named(named: Map<String, Value>) -> Self {
        Self {
            positional: Vec::new(),
            named,
        }
    }

    /// Maps a JSON-RPC `params` member onto call arguments: an array becomes
    /// positional arguments, an object becomes keyword arguments, absence
    /// means no arguments.
    pub fn from_params(params: Option<Value>) -> Result<Self, AppError> {
        match params {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Array(positional)) => Ok(Self::positional(positional)),
            Some(Value::Object(named)) => Ok(Self::named(named)),
            Some(_) => Err(AppError::bad_request(
                "invalid_params",
                "params must be an array or an object",
            )),
        }
    }
}

/// A callable exposed through the registry.
#[async_trait]
pub trait RpcHandler: Send + Sync {
    async fn call(&self, args: CallArgs) -> Result<Value, AppError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> RpcHandler for FnHandler<F>
where
    F: Fn(CallArgs) -> Result<Value, AppError> + Send + Sync + 'static,
{
    async fn call(&self, args: CallArgs) -> Result<Value, AppError> {
        (self.0)(args)
    }
}

/// Wraps a plain synchronous function as an [`RpcHandler`].
pub fn handler_fn<F>(function: F) -> Arc<dyn RpcHandler>
where
    F: Fn(CallArgs) -> Result<Value, AppError> + Send + Sync + 'static,
{
    Arc::new(FnHandler(function))
}

impl MethodRegistry {
    /// Executes the callable behind a resolved descriptor.
    ///
    /// The handler is re-acquired by external name at call time, so a
    /// descriptor obtained from an earlier snapshot fails with
    /// [`AppError::Resolution`] if the registry was cleared in between. The
    /// handler's own error is returned untranslated.
    pub async fn invoke(
        &self,
        descriptor: &MethodDescriptor,
        args: CallArgs,
    ) -> Result<Value, AppError> {
        let handler = self
            .handler(&descriptor.external_name)
            .ok_or_else(|| AppError::resolution(&descriptor.external_name))?;

        handler.call(args).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{handler_fn, CallArgs};
    use crate::errors::AppError;
    use crate::registry::descriptor::Protocol;
    use crate::registry::store::{MethodBinding, MethodRegistry};

    fn square_binding() -> MethodBinding {
        let handler = handler_fn(|args: CallArgs| {
            let x = args
                .positional
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| AppError::bad_request("invalid_params", "expected one integer"))?;
            Ok(json!(x * x))
        });
        MethodBinding::new("app::math", "square", handler)
    }

    #[test]
    fn params_array_becomes_positional_args() {
        let args = CallArgs::from_params(Some(json!([4, "x"]))).expect("valid params");
        assert_eq!(args.positional, vec![json!(4), json!("x")]);
        assert!(args.named.is_empty());
    }

    #[test]
    fn params_object_becomes_named_args() {
        let args = CallArgs::from_params(Some(json!({"x": 4}))).expect("valid params");
        assert!(args.positional.is_empty());
        assert_eq!(args.named.get("x"), Some(&json!(4)));
    }

    #[test]
    fn scalar_params_are_rejected() {
        let error = CallArgs::from_params(Some(json!(42))).expect_err("scalar params must fail");
        assert!(error.to_string().contains("bad request"));
    }

    #[tokio::test]
    async fn invoking_square_with_four_returns_sixteen() {
        let registry = MethodRegistry::new();
        registry.register(square_binding()).expect("registers");

        let descriptor = registry
            .get("square", "main", Protocol::Json)
            .expect("descriptor resolves");
        let result = registry
            .invoke(&descriptor, CallArgs::positional(vec![json!(4)]))
            .await
            .expect("invocation succeeds");

        assert_eq!(result, json!(16));
    }

    #[tokio::test]
    async fn handler_errors_propagate_unchanged() {
        let registry = MethodRegistry::new();
        let handler = handler_fn(|_| Err(AppError::fault(-32050, "quota exceeded")));
        registry
            .register(MethodBinding::new("app::quota", "consume", handler))
            .expect("registers");

        let descriptor = registry
            .get("consume", "main", Protocol::Json)
            .expect("descriptor resolves");
        let error = registry
            .invoke(&descriptor, CallArgs::default())
            .await
            .expect_err("handler fault must surface");

        assert!(matches!(
            error,
            AppError::Fault { code: -32050, ref message } if message == "quota exceeded"
        ));
    }

    #[tokio::test]
    async fn invoking_after_clear_fails_with_resolution_error() {
        let registry = MethodRegistry::new();
        registry.register(square_binding()).expect("registers");

        let descriptor = registry
            .get("square", "main", Protocol::Json)
            .expect("descriptor resolves");
        registry.clear();

        let error = registry
            .invoke(&descriptor, CallArgs::positional(vec![json!(4)]))
            .await
            .expect_err("handler is gone");

        assert!(matches!(error, AppError::Resolution { ref name } if name == "square"));
    }
}
