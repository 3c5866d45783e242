// Sysbus Gateway - Rule Model
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Firewall rules: rich rules, ports and services attached to a zone.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PortPair;

/// Which kind of rule a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Rich,
    Port,
    Service,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleType::Rich => f.write_str("rich"),
            RuleType::Port => f.write_str("port"),
            RuleType::Service => f.write_str("service"),
        }
    }
}

/// A single rule. Rules have no identity beyond `(zone, type, payload)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Free-form rule in firewalld's rich rule grammar.
    Rich { rule: String },
    Port { port: String, protocol: String },
    Service { service: String },
}

impl Rule {
    pub fn rich(rule: &str) -> Self {
        Rule::Rich {
            rule: rule.to_string(),
        }
    }

    pub fn port(port: &str, protocol: &str) -> Self {
        Rule::Port {
            port: port.to_string(),
            protocol: protocol.to_string(),
        }
    }

    pub fn service(service: &str) -> Self {
        Rule::Service {
            service: service.to_string(),
        }
    }

    pub fn rule_type(&self) -> RuleType {
        match self {
            Rule::Rich { .. } => RuleType::Rich,
            Rule::Port { .. } => RuleType::Port,
            Rule::Service { .. } => RuleType::Service,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Rich { rule } => f.write_str(rule),
            Rule::Port { port, protocol } => write!(f, "{}", PortPair::new(port, protocol)),
            Rule::Service { service } => f.write_str(service),
        }
    }
}

/// A rule request is missing the fields its type requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{fields} required when rule_type is '{rule_type}'")]
pub struct RuleError {
    pub rule_type: RuleType,
    pub fields: &'static str,
}

/// Flat JSON form of a rule, as sent by API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRequest {
    pub zone: String,
    pub rule_type: RuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Echo of an applied rule.
pub type RuleResponse = RuleRequest;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl RuleRequest {
    /// Build the request for `rule` in `zone`.
    pub fn new(zone: &str, rule: &Rule) -> Self {
        let mut request = Self {
            zone: zone.to_string(),
            rule_type: rule.rule_type(),
            rule: None,
            port: None,
            protocol: None,
            service: None,
        };
        match rule {
            Rule::Rich { rule } => request.rule = Some(rule.clone()),
            Rule::Port { port, protocol } => {
                request.port = Some(port.clone());
                request.protocol = Some(protocol.clone());
            }
            Rule::Service { service } => request.service = Some(service.clone()),
        }
        request
    }

    /// Validate the type-specific fields and build the typed rule.
    ///
    /// This is consumer-side validation; the gateway itself forwards
    /// whatever it is given.
    pub fn rule(&self) -> Result<Rule, RuleError> {
        let missing = |fields| RuleError {
            rule_type: self.rule_type,
            fields,
        };
        match self.rule_type {
            RuleType::Rich => present(&self.rule)
                .map(Rule::rich)
                .ok_or_else(|| missing("rule")),
            RuleType::Port => match (present(&self.port), present(&self.protocol)) {
                (Some(port), Some(protocol)) => Ok(Rule::port(port, protocol)),
                _ => Err(missing("port and protocol")),
            },
            RuleType::Service => present(&self.service)
                .map(Rule::service)
                .ok_or_else(|| missing("service")),
        }
    }
}
