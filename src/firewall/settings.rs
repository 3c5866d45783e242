// Sysbus Gateway - Zone Settings Codec
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Encoding and decoding of firewalld's positional zone settings tuple.
//!
//! The tuple is a 16-field structure whose meaning is fixed by position:
//!
//! | idx | field                  | signature  |
//! |-----|------------------------|------------|
//! | 0   | version                | `s`        |
//! | 1   | name                   | `s`        |
//! | 2   | description            | `s`        |
//! | 3   | unused                 | `b`        |
//! | 4   | target                 | `s`        |
//! | 5   | services               | `as`       |
//! | 6   | ports                  | `a(ss)`    |
//! | 7   | icmp blocks            | `as`       |
//! | 8   | masquerade             | `b`        |
//! | 9   | forward ports          | `a(ssss)`  |
//! | 10  | interfaces             | `as`       |
//! | 11  | sources                | `as`       |
//! | 12  | rich rules             | `as`       |
//! | 13  | protocols              | `as`       |
//! | 14  | source ports           | `a(ss)`    |
//! | 15  | icmp block inversion   | `b`        |
//!
//! Older firewalld versions send a shorter tuple. Missing trailing fields are
//! unset, not errors. Only this module touches raw positions.

use std::collections::BTreeSet;

use crate::bus::Variant;
use crate::error::DecodeError;
use crate::models::{PortPair, ZoneCreateRequest};

/// Version literal written into every encoded tuple.
pub const SETTINGS_VERSION: &str = "1.0";

/// Target used when a new zone is created without one.
pub const DEFAULT_TARGET: &str = "default";

/// Number of fields in an encoded tuple.
pub const FIELD_COUNT: usize = 16;

/// Shortest tuple accepted on decode.
pub const MIN_FIELD_COUNT: usize = 3;

/// Full wire signature of the settings tuple.
pub const SETTINGS_SIGNATURE: &str = "(sssbsasa(ss)asba(ssss)asasasasa(ss)b)";

mod index {
    pub const VERSION: usize = 0;
    pub const NAME: usize = 1;
    pub const DESCRIPTION: usize = 2;
    pub const UNUSED: usize = 3;
    pub const TARGET: usize = 4;
    pub const SERVICES: usize = 5;
    pub const PORTS: usize = 6;
    pub const ICMP_BLOCKS: usize = 7;
    pub const MASQUERADE: usize = 8;
    pub const FORWARD_PORTS: usize = 9;
    pub const INTERFACES: usize = 10;
    pub const SOURCES: usize = 11;
    pub const RICH_RULES: usize = 12;
    pub const PROTOCOLS: usize = 13;
    pub const SOURCE_PORTS: usize = 14;
    pub const ICMP_BLOCK_INVERSION: usize = 15;
}

/// A forward-port entry: `(port, protocol, to-port, to-address)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForwardPort {
    pub port: String,
    pub protocol: String,
    pub to_port: String,
    pub to_addr: String,
}

/// Caller-supplied settings for a new zone. Empty strings mean unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZoneSettings {
    pub description: String,
    pub target: String,
}

impl ZoneSettings {
    pub fn new(description: &str, target: &str) -> Self {
        Self {
            description: description.to_string(),
            target: target.to_string(),
        }
    }
}

impl From<&ZoneCreateRequest> for ZoneSettings {
    fn from(request: &ZoneCreateRequest) -> Self {
        Self::new(&request.description, &request.target)
    }
}

/// The settings tuple with every position given a name and a type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZoneSettingsTuple {
    pub version: String,
    pub name: String,
    pub description: String,
    pub unused: bool,
    pub target: String,
    pub services: Vec<String>,
    pub ports: Vec<PortPair>,
    pub icmp_blocks: Vec<String>,
    pub masquerade: bool,
    pub forward_ports: Vec<ForwardPort>,
    pub interfaces: Vec<String>,
    pub sources: Vec<String>,
    pub rich_rules: Vec<String>,
    pub protocols: Vec<String>,
    pub source_ports: Vec<PortPair>,
    pub icmp_block_inversion: bool,
}

/// A secondary field that could not be decoded and was left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultedField {
    pub field: &'static str,
    pub reason: String,
}

/// Result of decoding a received tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSettings {
    pub tuple: ZoneSettingsTuple,
    /// Number of positional fields actually received.
    pub received: usize,
    pub defaulted: Vec<DefaultedField>,
}

impl ZoneSettingsTuple {
    /// Build the tuple sent when creating zone `name`.
    pub fn for_new_zone(name: &str, settings: &ZoneSettings) -> Self {
        let target = if settings.target.is_empty() {
            DEFAULT_TARGET.to_string()
        } else {
            settings.target.clone()
        };
        Self {
            version: SETTINGS_VERSION.to_string(),
            name: name.to_string(),
            description: settings.description.clone(),
            target,
            ..Self::default()
        }
    }

    /// Encode into the full 16-field wire structure.
    pub fn encode(&self) -> Variant {
        let mut fields = vec![Variant::Bool(false); FIELD_COUNT];
        fields[index::VERSION] = Variant::from(self.version.as_str());
        fields[index::NAME] = Variant::from(self.name.as_str());
        fields[index::DESCRIPTION] = Variant::from(self.description.as_str());
        fields[index::UNUSED] = Variant::Bool(self.unused);
        fields[index::TARGET] = Variant::from(self.target.as_str());
        fields[index::SERVICES] = Variant::strings(&self.services);
        fields[index::PORTS] = encode_pairs(&self.ports);
        fields[index::ICMP_BLOCKS] = Variant::strings(&self.icmp_blocks);
        fields[index::MASQUERADE] = Variant::Bool(self.masquerade);
        fields[index::FORWARD_PORTS] = Variant::structs(
            "(ssss)",
            self.forward_ports
                .iter()
                .map(|fp| {
                    vec![
                        Variant::from(fp.port.as_str()),
                        Variant::from(fp.protocol.as_str()),
                        Variant::from(fp.to_port.as_str()),
                        Variant::from(fp.to_addr.as_str()),
                    ]
                })
                .collect(),
        );
        fields[index::INTERFACES] = Variant::strings(&self.interfaces);
        fields[index::SOURCES] = Variant::strings(&self.sources);
        fields[index::RICH_RULES] = Variant::strings(&self.rich_rules);
        fields[index::PROTOCOLS] = Variant::strings(&self.protocols);
        fields[index::SOURCE_PORTS] = encode_pairs(&self.source_ports);
        fields[index::ICMP_BLOCK_INVERSION] = Variant::Bool(self.icmp_block_inversion);
        Variant::Struct(fields)
    }

    /// Decode a received tuple of at least [`MIN_FIELD_COUNT`] fields.
    ///
    /// Fields past the received length are left empty. Fields present but
    /// of the wrong type are also left empty and listed in
    /// [`DecodedSettings::defaulted`]. Malformed port pairs are skipped.
    pub fn decode(value: Variant) -> Result<DecodedSettings, DecodeError> {
        let fields = match value.unboxed() {
            Variant::Struct(fields) if fields.len() >= MIN_FIELD_COUNT => fields,
            other => {
                return Err(DecodeError::new(
                    "settings",
                    SETTINGS_SIGNATURE,
                    other.signature(),
                ))
            }
        };

        let mut reader = FieldReader {
            fields: &fields,
            defaulted: Vec::new(),
        };
        let tuple = Self {
            version: reader.string(index::VERSION, "version"),
            name: reader.string(index::NAME, "name"),
            description: reader.string(index::DESCRIPTION, "description"),
            unused: reader.boolean(index::UNUSED, "unused"),
            target: reader.string(index::TARGET, "target"),
            services: reader.strings(index::SERVICES, "services"),
            ports: reader.pairs(index::PORTS, "ports"),
            icmp_blocks: reader.strings(index::ICMP_BLOCKS, "icmp_blocks"),
            masquerade: reader.boolean(index::MASQUERADE, "masquerade"),
            forward_ports: reader.forward_ports(index::FORWARD_PORTS, "forward_ports"),
            interfaces: reader.strings(index::INTERFACES, "interfaces"),
            sources: reader.strings(index::SOURCES, "sources"),
            rich_rules: reader.strings(index::RICH_RULES, "rich_rules"),
            protocols: reader.strings(index::PROTOCOLS, "protocols"),
            source_ports: reader.pairs(index::SOURCE_PORTS, "source_ports"),
            icmp_block_inversion: reader
                .boolean(index::ICMP_BLOCK_INVERSION, "icmp_block_inversion"),
        };

        Ok(DecodedSettings {
            tuple,
            received: fields.len(),
            defaulted: reader.defaulted,
        })
    }
}

/// The projected zone attributes, loaded as one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZoneSnapshot {
    pub description: String,
    pub target: String,
    pub services: BTreeSet<String>,
    /// Entries in `port/protocol` form, in remote order.
    pub ports: Vec<String>,
    pub rich_rules: Vec<String>,
}

impl From<ZoneSettingsTuple> for ZoneSnapshot {
    fn from(tuple: ZoneSettingsTuple) -> Self {
        Self {
            description: tuple.description,
            target: tuple.target,
            services: tuple.services.into_iter().collect(),
            ports: tuple.ports.iter().map(PortPair::display_string).collect(),
            rich_rules: tuple.rich_rules,
        }
    }
}

fn encode_pairs(pairs: &[PortPair]) -> Variant {
    Variant::structs(
        "(ss)",
        pairs
            .iter()
            .map(|p| vec![Variant::from(p.port.as_str()), Variant::from(p.protocol.as_str())])
            .collect(),
    )
}

struct FieldReader<'a> {
    fields: &'a [Variant],
    defaulted: Vec<DefaultedField>,
}

impl FieldReader<'_> {
    fn get(&self, idx: usize) -> Option<&Variant> {
        match self.fields.get(idx) {
            Some(Variant::Boxed(inner)) => Some(inner.as_ref()),
            other => other,
        }
    }

    fn mismatch(&mut self, field: &'static str, expected: &str, found: &Variant) {
        self.defaulted.push(DefaultedField {
            field,
            reason: format!("expected '{}', found '{}'", expected, found.signature()),
        });
    }

    fn string(&mut self, idx: usize, field: &'static str) -> String {
        match self.get(idx) {
            None => String::new(),
            Some(Variant::Str(s)) => s.clone(),
            Some(other) => {
                let other = other.clone();
                self.mismatch(field, "s", &other);
                String::new()
            }
        }
    }

    fn boolean(&mut self, idx: usize, field: &'static str) -> bool {
        match self.get(idx) {
            None => false,
            Some(Variant::Bool(b)) => *b,
            Some(other) => {
                let other = other.clone();
                self.mismatch(field, "b", &other);
                false
            }
        }
    }

    fn strings(&mut self, idx: usize, field: &'static str) -> Vec<String> {
        let value = match self.get(idx) {
            None => return Vec::new(),
            Some(value) => value.clone(),
        };
        let items = match &value {
            Variant::Array { items, .. } => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>(),
            _ => None,
        };
        items.unwrap_or_else(|| {
            self.mismatch(field, "as", &value);
            Vec::new()
        })
    }

    /// Lenient `a(ss)` reader: also accepts `aas`, skips malformed entries.
    fn pairs(&mut self, idx: usize, field: &'static str) -> Vec<PortPair> {
        let items = match self.get(idx) {
            None => return Vec::new(),
            Some(Variant::Array { items, .. }) => items.clone(),
            Some(other) => {
                let other = other.clone();
                self.mismatch(field, "a(ss)", &other);
                return Vec::new();
            }
        };

        let mut pairs = Vec::with_capacity(items.len());
        for item in &items {
            match string_members(item).as_deref() {
                Some([port, protocol]) => pairs.push(PortPair::new(port, protocol)),
                _ => self.mismatch(field, "(ss)", item),
            }
        }
        pairs
    }

    fn forward_ports(&mut self, idx: usize, field: &'static str) -> Vec<ForwardPort> {
        let items = match self.get(idx) {
            None => return Vec::new(),
            Some(Variant::Array { items, .. }) => items.clone(),
            Some(other) => {
                let other = other.clone();
                self.mismatch(field, "a(ssss)", &other);
                return Vec::new();
            }
        };

        let mut forwards = Vec::with_capacity(items.len());
        for item in &items {
            match string_members(item).as_deref() {
                Some([port, protocol, to_port, to_addr]) => forwards.push(ForwardPort {
                    port: port.clone(),
                    protocol: protocol.clone(),
                    to_port: to_port.clone(),
                    to_addr: to_addr.clone(),
                }),
                _ => self.mismatch(field, "(ssss)", item),
            }
        }
        forwards
    }
}

/// Members of a struct or array entry, if every member is a string.
fn string_members(item: &Variant) -> Option<Vec<String>> {
    let members = match item {
        Variant::Struct(members) => members,
        Variant::Array { items, .. } => items,
        _ => return None,
    };
    members
        .iter()
        .map(|m| m.as_str().map(str::to_string))
        .collect()
}
