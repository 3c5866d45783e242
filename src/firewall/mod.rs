// Sysbus Gateway - Firewall Module
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Firewalld gateway, zone proxies and the zone settings codec.

mod client;
mod settings;
mod zone;

pub use client::FirewallGateway;
pub use settings::{
    DecodedSettings, DefaultedField, ForwardPort, ZoneSettings, ZoneSettingsTuple, ZoneSnapshot,
    DEFAULT_TARGET, FIELD_COUNT, SETTINGS_SIGNATURE, SETTINGS_VERSION,
};
pub use zone::ZoneObject;

/// D-Bus bus name for firewalld.
pub const BUS_NAME: &str = "org.fedoraproject.FirewallD1";

/// D-Bus object paths.
pub mod paths {
    pub const ROOT: &str = "/org/fedoraproject/FirewallD1";
    /// Suffix appended to the root path for the permanent configuration.
    pub const CONFIG_SUFFIX: &str = "/config";
}

/// Methods and properties called on firewalld.
pub mod members {
    /// Called on the `.zone` interface, where firewalld exposes it, rather
    /// than on the bare prefix.
    pub const GET_ZONES: &str = "getZones";
    pub const GET_ZONE_BY_NAME: &str = "getZoneByName";
    pub const ADD_ZONE: &str = "addZone";
    pub const REMOVE_ZONE: &str = "removeZone";
    pub const GET_SETTINGS: &str = "getSettings";
    pub const ADD_RICH_RULE: &str = "addRichRule";
    pub const REMOVE_RICH_RULE: &str = "removeRichRule";
    pub const ADD_PORT: &str = "addPort";
    pub const REMOVE_PORT: &str = "removePort";
    pub const ADD_SERVICE: &str = "addService";
    pub const REMOVE_SERVICE: &str = "removeService";

    pub const VERSION: &str = "version";
    pub const NAME: &str = "name";
}

/// D-Bus interface names, derived from one namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interfaces {
    /// Main interface (`version`).
    pub main: String,
    /// Runtime zone operations (`getZones`, `addPort`, ...).
    pub zone: String,
    /// Permanent configuration (`getZoneByName`, `addZone`, ...).
    pub config: String,
    /// Per-zone configuration objects (`getSettings`).
    pub config_zone: String,
}

impl Interfaces {
    pub fn from_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('.');
        Self {
            main: prefix.to_string(),
            zone: format!("{}.zone", prefix),
            config: format!("{}.config", prefix),
            config_zone: format!("{}.config.zone", prefix),
        }
    }
}

impl Default for Interfaces {
    fn default() -> Self {
        Self::from_prefix(BUS_NAME)
    }
}
