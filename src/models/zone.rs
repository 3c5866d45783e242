// Sysbus Gateway - Zone Model
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Firewall zone JSON representations.

use serde::{Deserialize, Serialize};

/// A firewall zone as exposed to API consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneResponse {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    /// Entries in `port/protocol` form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rich_rules: Vec<String>,
}

impl ZoneResponse {
    /// Create a new zone response with no settings.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// The response returned right after a zone is created.
    pub fn created(request: &ZoneCreateRequest) -> Self {
        Self {
            name: request.name.clone(),
            description: request.description.clone(),
            target: request.target.clone(),
            ..Default::default()
        }
    }
}

/// Request body for creating a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
}
