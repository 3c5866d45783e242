// Sysbus Gateway - Storage Module
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! ZFS daemon gateway and pool proxies.

mod client;
mod pool;

pub use client::StorageGateway;
pub use pool::PoolObject;

/// D-Bus bus name for the ZFS daemon.
pub const BUS_NAME: &str = "com.nickrobison.dbus.zfs1";

/// Root object path.
pub const ROOT_PATH: &str = "/com/nickrobison/dbus/zfs1";

/// Namespace of the daemon's interfaces.
pub const INTERFACE_PREFIX: &str = "com.nickrobison.dbus.ZFS1";

/// Properties read from the daemon.
pub mod properties {
    pub const POOLS: &str = "Pools";
    pub const VERSION: &str = "Version";
    pub const NAME: &str = "Name";
}

/// D-Bus interface names, derived from one namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interfaces {
    pub main: String,
    pub pool: String,
}

impl Interfaces {
    pub fn from_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('.');
        Self {
            main: prefix.to_string(),
            pool: format!("{}.Pool", prefix),
        }
    }
}
