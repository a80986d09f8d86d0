//! Concurrency-safe method store
//!
//! One registry per process, shared across request workers. Registration is a
//! read-check-write critical section behind the write lock; lookups and
//! listings take the read lock only long enough to clone descriptor handles.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::debug;

use crate::registry::descriptor::{EntryPointFilter, MethodDescriptor, Protocol, ProtocolFilter};
use crate::registry::invoker::RpcHandler;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two incompatible definitions were registered under one external name.
    /// Signals a programming or deployment defect; raised synchronously to
    /// the registering code so startup fails fast.
    #[error("an RPC method named {name} has already been registered with a different definition")]
    DuplicateName { name: String },
}

/// Registration input: the handler plus the identity and constraints of the
/// method being exposed.
///
/// `location` and `callable_name` identify the owning code unit and the
/// function within it; the external name defaults to the callable name.
pub struct MethodBinding {
    handler: Arc<dyn RpcHandler>,
    location: String,
    callable_name: String,
    external_name: Option<String>,
    entry_points: EntryPointFilter,
    protocols: ProtocolFilter,
}

impl MethodBinding {
    pub fn new(
        location: impl Into<String>,
        callable_name: impl Into<String>,
        handler: Arc<dyn RpcHandler>,
    ) -> Self {
        Self {
            handler,
            location: location.into(),
            callable_name: callable_name.into(),
            external_name: None,
            entry_points: EntryPointFilter::All,
            protocols: ProtocolFilter::All,
        }
    }

    pub fn named(mut self, external_name: impl Into<String>) -> Self {
        self.external_name = Some(external_name.into());
        self
    }

    pub fn entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_points = EntryPointFilter::named(entry_point);
        self
    }

    /// Restricts the method to a single protocol variant; normalized to a
    /// singleton set.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocols = ProtocolFilter::only(protocol);
        self
    }

    pub fn protocols(mut self, protocols: impl IntoIterator<Item = Protocol>) -> Self {
        self.protocols = ProtocolFilter::any_of(protocols);
        self
    }

    fn into_parts(self) -> (MethodDescriptor, Arc<dyn RpcHandler>) {
        let external_name = self
            .external_name
            .unwrap_or_else(|| self.callable_name.clone());
        let descriptor = MethodDescriptor {
            location: self.location,
            callable_name: self.callable_name,
            external_name,
            entry_points: self.entry_points,
            protocols: self.protocols,
        };
        (descriptor, self.handler)
    }
}

struct RegisteredMethod {
    descriptor: Arc<MethodDescriptor>,
    handler: Arc<dyn RpcHandler>,
}

/// Process-wide store mapping external name to descriptor and handler.
#[derive(Default)]
pub struct MethodRegistry {
    methods: RwLock<HashMap<String, RegisteredMethod>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method, rejecting conflicting duplicates.
    ///
    /// Re-registering an identical definition is a no-op: the same function
    /// is commonly wired up from more than one initialization path. A
    /// different definition under an existing name fails and leaves the
    /// stored entry untouched.
    pub fn register(&self, binding: MethodBinding) -> Result<(), RegistryError> {
        let (descriptor, handler) = binding.into_parts();
        let mut methods = self.methods.write().expect("registry lock poisoned");

        if let Some(existing) = methods.get(&descriptor.external_name) {
            if *existing.descriptor == descriptor {
                debug!(method = %descriptor.external_name, "method already registered, skipping");
                return Ok(());
            }
            return Err(RegistryError::DuplicateName {
                name: descriptor.external_name,
            });
        }

        debug!(method = %descriptor.external_name, location = %descriptor.location, "registering RPC method");
        methods.insert(
            descriptor.external_name.clone(),
            RegisteredMethod {
                descriptor: Arc::new(descriptor),
                handler,
            },
        );
        Ok(())
    }

    /// Resolves a descriptor by name for the given call context.
    ///
    /// An unknown name and a name that exists but is not usable from this
    /// entry point or protocol both collapse to `None`.
    pub fn get(
        &self,
        name: &str,
        entry_point: &str,
        protocol: Protocol,
    ) -> Option<Arc<MethodDescriptor>> {
        let methods = self.methods.read().expect("registry lock poisoned");
        methods
            .get(name)
            .filter(|method| method.descriptor.is_valid_for(entry_point, protocol))
            .map(|method| Arc::clone(&method.descriptor))
    }

    /// External names usable for the given call context, sorted so a given
    /// store snapshot yields a deterministic listing.
    pub fn list_methods(&self, entry_point: &str, protocol: Protocol) -> Vec<String> {
        let methods = self.methods.read().expect("registry lock poisoned");
        let mut names: Vec<String> = methods
            .values()
            .filter(|method| method.descriptor.is_valid_for(entry_point, protocol))
            .map(|method| method.descriptor.external_name.clone())
            .collect();
        names.sort();
        names
    }

    /// Every registered external name regardless of constraints, sorted.
    pub fn list_all(&self) -> Vec<String> {
        let methods = self.methods.read().expect("registry lock poisoned");
        let mut names: Vec<String> = methods.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Administrative reset; the only operation that removes entries.
    pub fn clear(&self) {
        self.methods.write().expect("registry lock poisoned").clear();
    }

    pub(crate) fn handler(&self, name: &str) -> Option<Arc<dyn RpcHandler>> {
        let methods = self.methods.read().expect("registry lock poisoned");
        methods.get(name).map(|method| Arc::clone(&method.handler))
    }
}
