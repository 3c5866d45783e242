// Sysbus Gateway - Diagnostics
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Diagnostics sink injected into every bus-facing component.
//!
//! Records emitted here are informational only; nothing in the crate makes
//! decisions based on them. Components receive an `Arc<dyn Diagnostics>` at
//! construction instead of reaching for a process-wide logger, so tests can
//! observe what the decode path saw.

use std::fmt;
use std::sync::Arc;

/// Receiver of informational records from the bus layer.
pub trait Diagnostics: Send + Sync + fmt::Debug {
    /// A property was fetched; `signature` is the observed wire signature.
    fn property_received(&self, path: &str, property: &str, signature: &str);

    /// A secondary zone settings field could not be decoded and was
    /// replaced by its empty value.
    fn field_defaulted(&self, path: &str, field: &str, reason: &str);

    /// A method call is about to be issued.
    fn call_issued(&self, path: &str, interface: &str, member: &str) {
        let _ = (path, interface, member);
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn property_received(&self, path: &str, property: &str, signature: &str) {
        tracing::debug!(path, property, signature, "Received property");
    }

    fn field_defaulted(&self, path: &str, field: &str, reason: &str) {
        tracing::warn!(path, field, reason, "Settings field defaulted");
    }

    fn call_issued(&self, path: &str, interface: &str, member: &str) {
        tracing::trace!(path, interface, member, "Calling method");
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    #[inline]
    fn property_received(&self, _path: &str, _property: &str, _signature: &str) {}

    #[inline]
    fn field_defaulted(&self, _path: &str, _field: &str, _reason: &str) {}
}

/// The sink used when a component is built without an explicit one.
pub fn default_diagnostics() -> Arc<dyn Diagnostics> {
    Arc::new(TracingDiagnostics)
}
