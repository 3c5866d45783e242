// Sysbus Gateway - Test Support
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! In-memory bus and diagnostics used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{Bus, BusObject, Diagnostics, Variant};
use crate::error::BusError;

/// A method call observed by [`FakeBus`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub interface: String,
    pub member: String,
    pub args: Vec<Variant>,
}

type Reply = Result<Vec<Variant>, BusError>;

/// Scripted bus: replies are keyed by object path and member, optionally
/// narrowed by the first string argument.
#[derive(Debug, Default)]
pub struct FakeBus {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<HashMap<(String, String, Option<String>), Reply>>,
    properties: Mutex<HashMap<(String, String), Result<Variant, BusError>>>,
    property_reads: Mutex<Vec<(String, String)>>,
    delay: Option<Duration>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call and property read sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn on_call(&self, path: &str, member: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert((path.to_string(), member.to_string(), None), reply);
    }

    pub fn on_call_with(&self, path: &str, member: &str, first_arg: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(
            (path.to_string(), member.to_string(), Some(first_arg.to_string())),
            reply,
        );
    }

    pub fn set_property(&self, path: &str, property: &str, value: Variant) {
        self.properties
            .lock()
            .unwrap()
            .insert((path.to_string(), property.to_string()), Ok(value));
    }

    pub fn fail_property(&self, path: &str, property: &str, error: BusError) {
        self.properties
            .lock()
            .unwrap()
            .insert((path.to_string(), property.to_string()), Err(error));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made to `member`, on any object.
    pub fn count(&self, member: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.member == member)
            .count()
    }

    pub fn property_reads(&self) -> Vec<(String, String)> {
        self.property_reads.lock().unwrap().clone()
    }

    fn lookup(&self, path: &str, member: &str, args: &[Variant]) -> Reply {
        let replies = self.replies.lock().unwrap();
        let first = args.first().and_then(Variant::as_str).map(str::to_string);
        let specific = first.map(|arg| (path.to_string(), member.to_string(), Some(arg)));
        specific
            .and_then(|key| replies.get(&key).cloned())
            .or_else(|| {
                replies
                    .get(&(path.to_string(), member.to_string(), None))
                    .cloned()
            })
            .unwrap_or_else(|| {
                Err(BusError::remote(
                    "org.freedesktop.DBus.Error.UnknownMethod",
                    format!("no reply scripted for {} on {}", member, path),
                ))
            })
    }
}

impl Bus for FakeBus {
    async fn call(
        &self,
        object: &BusObject,
        interface: &str,
        member: &str,
        args: Vec<Variant>,
    ) -> Result<Vec<Variant>, BusError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: object.path.as_str().to_string(),
            interface: interface.to_string(),
            member: member.to_string(),
            args: args.clone(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.lookup(object.path.as_str(), member, &args)
    }

    async fn get_property(
        &self,
        object: &BusObject,
        _interface: &str,
        property: &str,
    ) -> Result<Variant, BusError> {
        self.property_reads
            .lock()
            .unwrap()
            .push((object.path.as_str().to_string(), property.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let properties = self.properties.lock().unwrap();
        properties
            .get(&(object.path.as_str().to_string(), property.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(BusError::remote(
                    "org.freedesktop.DBus.Error.UnknownProperty",
                    format!("no property {} on {}", property, object.path),
                ))
            })
    }
}

/// Diagnostics sink that keeps every record for assertions.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    properties: Mutex<Vec<(String, String, String)>>,
    defaulted: Mutex<Vec<(String, String)>>,
}

impl RecordingDiagnostics {
    pub fn properties(&self) -> Vec<(String, String, String)> {
        self.properties.lock().unwrap().clone()
    }

    /// `(field, reason)` pairs.
    pub fn defaulted(&self) -> Vec<(String, String)> {
        self.defaulted.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn property_received(&self, path: &str, property: &str, signature: &str) {
        self.properties.lock().unwrap().push((
            path.to_string(),
            property.to_string(),
            signature.to_string(),
        ));
    }

    fn field_defaulted(&self, _path: &str, field: &str, reason: &str) {
        self.defaulted
            .lock()
            .unwrap()
            .push((field.to_string(), reason.to_string()));
    }
}
