// Sysbus Gateway - Port Model
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Firewall port/protocol pair.

use std::fmt;

/// A port (or port range) with its protocol, e.g. `8080/tcp`.
///
/// firewalld keeps the two halves apart on the wire; everything outside the
/// bus layer sees the joined `port/protocol` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PortPair {
    pub port: String,
    pub protocol: String,
}

impl PortPair {
    /// Create a new port pair.
    pub fn new(port: &str, protocol: &str) -> Self {
        Self {
            port: port.to_string(),
            protocol: protocol.to_string(),
        }
    }

    /// Parse a port string like "8080/tcp" or "1025-65535/udp".
    ///
    /// Splits on the last `/`; both halves must be non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (port, protocol) = s.rsplit_once('/')?;
        if port.is_empty() || protocol.is_empty() {
            return None;
        }
        Some(Self::new(port, protocol))
    }

    /// Get the joined `port/protocol` string.
    pub fn display_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PortPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}
