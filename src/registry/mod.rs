//! Method registry and dispatch core
//!
//! Maps public method names to immutable descriptors and live handlers,
//! detects conflicting registrations, and resolves calls by name plus the
//! caller's entry point and protocol.

pub mod descriptor;
pub mod invoker;
pub mod store;

pub use descriptor::{EntryPointFilter, MethodDescriptor, Protocol, ProtocolFilter};
pub use invoker::{handler_fn, CallArgs, RpcHandler};
pub use store::{MethodBinding, MethodRegistry, RegistryError};
