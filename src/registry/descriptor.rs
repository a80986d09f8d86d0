//! Immutable descriptions of registered RPC methods
//!
//! A [`MethodDescriptor`] records where a method lives, the public name clients
//! use, and the entry-point / protocol constraints checked at resolution time.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Wire-format variant an RPC request arrives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Xml,
    Json,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            _ => Err(AppError::bad_request(
                "invalid_protocol",
                "protocol must be one of: xml, json",
            )),
        }
    }
}

/// Entry-point constraint: the wildcard, or one named endpoint group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPointFilter {
    All,
    Named(String),
}

impl EntryPointFilter {
    pub fn named(entry_point: impl Into<String>) -> Self {
        Self::Named(entry_point.into())
    }

    pub fn allows(&self, entry_point: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == entry_point,
        }
    }
}

/// Protocol constraint: the wildcard sentinel, or an explicit set of variants.
///
/// The wildcard is distinct from any set; a scalar protocol is normalized to a
/// singleton set at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolFilter {
    All,
    Only(BTreeSet<Protocol>),
}

impl ProtocolFilter {
    pub fn only(protocol: Protocol) -> Self {
        Self::Only(BTreeSet::from([protocol]))
    }

    pub fn any_of(protocols: impl IntoIterator<Item = Protocol>) -> Self {
        Self::Only(protocols.into_iter().collect())
    }

    pub fn allows(&self, protocol: Protocol) -> bool {
        match self {
            Self::All => true,
            Self::Only(protocols) => protocols.contains(&protocol),
        }
    }
}

/// The stored, immutable record of one registered method's identity and
/// constraints.
///
/// Two descriptors are equal iff external name, location, callable name and
/// both constraint filters all match; the registry relies on this to tell an
/// idempotent re-registration apart from a conflicting one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub location: String,
    pub callable_name: String,
    pub external_name: String,
    pub entry_points: EntryPointFilter,
    pub protocols: ProtocolFilter,
}

impl MethodDescriptor {
    pub fn available_for_protocol(&self, protocol: Protocol) -> bool {
        self.protocols.allows(protocol)
    }

    pub fn available_for_entry_point(&self, entry_point: &str) -> bool {
        self.entry_points.allows(entry_point)
    }

    /// Sole admission predicate used by the resolver.
    pub fn is_valid_for(&self, entry_point: &str, protocol: Protocol) -> bool {
        self.available_for_entry_point(entry_point) && self.available_for_protocol(protocol)
    }
}
