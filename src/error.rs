// Sysbus Gateway - Errors
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Error taxonomy shared by the bus layer and both gateways.

use std::fmt;

use thiserror::Error;

/// A failure reported by the bus transport or by the remote service.
///
/// The remote error name and text are kept verbatim so callers can show
/// exactly what firewalld or the storage daemon said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe_bus_error(.name, .message))]
pub struct BusError {
    /// D-Bus error name, e.g. `org.fedoraproject.FirewallD1.Exception`.
    pub name: Option<String>,
    /// Remote error text.
    pub message: String,
}

impl BusError {
    /// Create an error carrying a remote error name.
    pub fn remote(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
        }
    }

    /// Create a transport-level error with no remote error name.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
        }
    }

    /// Whether the remote side reported that the resource already exists.
    pub fn is_conflict(&self) -> bool {
        self.message.contains("NAME_CONFLICT") || self.message.contains("ALREADY_ENABLED")
    }
}

fn describe_bus_error(name: &Option<String>, message: &str) -> String {
    match name {
        Some(name) => format!("{}: {}", name, message),
        None => message.to_string(),
    }
}

/// A variant whose wire signature does not match the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode {property}: expected signature '{expected}', found '{found}'")]
pub struct DecodeError {
    pub property: String,
    pub expected: String,
    pub found: String,
}

impl DecodeError {
    pub fn new(
        property: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Why a call did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller cancelled the context.
    Cancelled,
    /// The context deadline passed before the reply arrived.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Top-level error for every gateway and proxy operation.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Wire variant incompatible with the expected type.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Transport or service-level failure, remote text preserved.
    #[error("{member} failed: {source}")]
    BusCall {
        member: String,
        #[source]
        source: BusError,
    },

    /// Name to object path resolution yielded no object.
    #[error("{name} not found: {source}")]
    NotFound {
        name: String,
        #[source]
        source: BusError,
    },

    /// A named resource already exists remotely.
    #[error("{name} already exists: {source}")]
    Conflict {
        name: String,
        #[source]
        source: BusError,
    },

    /// The caller's context was cancelled or timed out.
    #[error("call {0}")]
    Cancelled(CancelReason),
}

impl GatewayError {
    pub(crate) fn bus_call(member: impl Into<String>, source: BusError) -> Self {
        Self::BusCall {
            member: member.into(),
            source,
        }
    }

    /// Returns `true` for failures a caller may reasonably retry.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::BusCall { .. } | Self::Cancelled(_))
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a "conflict" error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The remote error, when the failure came from the bus.
    pub fn bus_error(&self) -> Option<&BusError> {
        match self {
            Self::BusCall { source, .. }
            | Self::NotFound { source, .. }
            | Self::Conflict { source, .. } => Some(source),
            Self::Decode(_) | Self::Cancelled(_) => None,
        }
    }
}

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;
