// Sysbus Gateway - Configuration
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Gateway settings read from a local JSON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{firewall, storage};

/// Which message bus to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

/// Where firewalld lives on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallService {
    #[serde(default = "default_firewall_destination")]
    pub destination: String,
    #[serde(default = "default_firewall_path")]
    pub path: String,
    /// Interface namespace, e.g. `org.fedoraproject.FirewallD1`.
    #[serde(default = "default_firewall_prefix")]
    pub prefix: String,
}

/// Where the ZFS daemon lives on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageService {
    #[serde(default = "default_storage_destination")]
    pub destination: String,
    #[serde(default = "default_storage_path")]
    pub path: String,
    #[serde(default = "default_storage_prefix")]
    pub prefix: String,
}

/// Gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub bus: BusKind,
    /// Per-request timeout in milliseconds. Zero disables the deadline.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default)]
    pub firewall: FirewallService,
    #[serde(default)]
    pub storage: StorageService,
}

fn default_firewall_destination() -> String { firewall::BUS_NAME.to_string() }
fn default_firewall_path() -> String { firewall::paths::ROOT.to_string() }
fn default_firewall_prefix() -> String { firewall::BUS_NAME.to_string() }
fn default_storage_destination() -> String { storage::BUS_NAME.to_string() }
fn default_storage_path() -> String { storage::ROOT_PATH.to_string() }
fn default_storage_prefix() -> String { storage::INTERFACE_PREFIX.to_string() }
fn default_call_timeout_ms() -> u64 { 5000 }

impl Default for FirewallService {
    fn default() -> Self {
        Self {
            destination: default_firewall_destination(),
            path: default_firewall_path(),
            prefix: default_firewall_prefix(),
        }
    }
}

impl Default for StorageService {
    fn default() -> Self {
        Self {
            destination: default_storage_destination(),
            path: default_storage_path(),
            prefix: default_storage_prefix(),
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            bus: BusKind::default(),
            call_timeout_ms: default_call_timeout_ms(),
            firewall: FirewallService::default(),
            storage: StorageService::default(),
        }
    }
}

/// Settings loaded from a JSON file.
#[derive(Debug)]
pub struct Settings {
    settings: GatewaySettings,
    path: PathBuf,
}

impl Settings {
    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sysbus-gateway")
            .join("settings.json")
    }

    /// Load from the default location.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from `path`, falling back to defaults if it is missing or
    /// unreadable.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = if path.exists() {
            read_settings(&path)
        } else {
            GatewaySettings::default()
        };
        Self { settings, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn gateway(&self) -> &GatewaySettings {
        &self.settings
    }

    pub fn bus(&self) -> BusKind {
        self.settings.bus
    }

    /// The per-request timeout, if any.
    pub fn call_timeout(&self) -> Option<Duration> {
        match self.settings.call_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn firewall(&self) -> &FirewallService {
        &self.settings.firewall
    }

    pub fn storage(&self) -> &StorageService {
        &self.settings.storage
    }
}

fn read_settings(path: &Path) -> GatewaySettings {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to parse settings: {}", e);
                GatewaySettings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read settings: {}", e);
            GatewaySettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(dir.path().join("settings.json"));
        assert_eq!(settings.gateway(), &GatewaySettings::default());
        assert_eq!(settings.bus(), BusKind::System);
        assert_eq!(settings.call_timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(settings.firewall().destination, "org.fedoraproject.FirewallD1");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "bus": "session", "call_timeout_ms": 0, "storage": { "prefix": "org.example.ZFS" } }"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.bus(), BusKind::Session);
        assert_eq!(settings.call_timeout(), None);
        assert_eq!(settings.storage().prefix, "org.example.ZFS");
        assert_eq!(settings.storage().destination, "com.nickrobison.dbus.zfs1");
        assert_eq!(settings.firewall(), &FirewallService::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path).gateway(), &GatewaySettings::default());
    }

    #[test]
    fn test_full_file_overrides_every_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let written = GatewaySettings {
            bus: BusKind::Session,
            call_timeout_ms: 250,
            firewall: FirewallService {
                destination: "org.example.Firewall".to_string(),
                path: "/org/example/Firewall".to_string(),
                prefix: "org.example.Firewall".to_string(),
            },
            storage: StorageService::default(),
        };
        fs::write(&path, serde_json::to_string_pretty(&written).unwrap()).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.path(), path.as_path());
        assert_eq!(settings.gateway(), &written);
        assert_eq!(settings.call_timeout(), Some(Duration::from_millis(250)));
    }
}
