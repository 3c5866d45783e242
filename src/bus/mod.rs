// Sysbus Gateway - Bus Module
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Bus abstraction shared by the firewall and storage gateways.
//!
//! Gateways talk to a [`Bus`] rather than to a concrete connection. The
//! production implementation is [`ZbusBus`]; tests use an in-memory fake.

mod context;
mod diagnostics;
mod properties;
mod resolver;
mod variant;
mod zbus_transport;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

pub use context::CallContext;
pub use diagnostics::{default_diagnostics, Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use properties::{decode_variant, FromVariant, PropertyDecoder};
pub use resolver::ObjectResolver;
pub use variant::{ObjectPath, Variant};
pub use zbus_transport::ZbusBus;

use crate::error::BusError;

/// Standard D-Bus properties interface.
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// A remote object: the service that owns it and its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusObject {
    pub destination: String,
    pub path: ObjectPath,
}

impl BusObject {
    pub fn new(destination: impl Into<String>, path: impl Into<ObjectPath>) -> Self {
        Self {
            destination: destination.into(),
            path: path.into(),
        }
    }

    /// Another object owned by the same service.
    pub fn sibling(&self, path: ObjectPath) -> Self {
        Self {
            destination: self.destination.clone(),
            path,
        }
    }
}

/// A message-bus connection.
///
/// Implementations must be safe for concurrent use by many in-flight calls;
/// callers never serialize against each other.
pub trait Bus: Send + Sync + 'static {
    /// Invoke `interface.member` on `object` with positional arguments and
    /// return the positional reply values.
    fn call(
        &self,
        object: &BusObject,
        interface: &str,
        member: &str,
        args: Vec<Variant>,
    ) -> impl Future<Output = Result<Vec<Variant>, BusError>> + Send;

    /// Read a single property as a self-describing variant.
    fn get_property(
        &self,
        object: &BusObject,
        interface: &str,
        property: &str,
    ) -> impl Future<Output = Result<Variant, BusError>> + Send;
}
