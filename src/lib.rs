// Sysbus Gateway - Library Root
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Typed operations over firewalld and a ZFS pool daemon, reached through
//! D-Bus.
//!
//! [`firewall::FirewallGateway`] and [`storage::StorageGateway`] are the
//! entry points. Both are generic over [`bus::Bus`], with
//! [`bus::ZbusBus`] as the production connection.

pub mod bus;
pub mod config;
pub mod error;
pub mod firewall;
pub mod models;
pub mod storage;

pub use error::{GatewayError, Result};
