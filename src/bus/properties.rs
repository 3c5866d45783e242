// Sysbus Gateway - Property Decoding
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Signature-checked decoding of remote properties.

use std::sync::Arc;

use super::{Bus, BusObject, CallContext, Diagnostics, ObjectPath, Variant};
use crate::error::{DecodeError, GatewayError, Result};

/// A type that can be decoded from a bus variant.
///
/// Every implementation declares the exact wire signature it accepts. The
/// signature is checked before conversion, so a mismatch is rejected at the
/// boundary rather than deep inside the conversion.
pub trait FromVariant: Sized {
    const SIGNATURE: &'static str;

    /// Convert a variant already known to carry [`Self::SIGNATURE`].
    fn from_variant(value: Variant) -> Option<Self>;
}

impl FromVariant for String {
    const SIGNATURE: &'static str = "s";

    fn from_variant(value: Variant) -> Option<Self> {
        match value {
            Variant::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl FromVariant for bool {
    const SIGNATURE: &'static str = "b";

    fn from_variant(value: Variant) -> Option<Self> {
        match value {
            Variant::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FromVariant for u32 {
    const SIGNATURE: &'static str = "u";

    fn from_variant(value: Variant) -> Option<Self> {
        match value {
            Variant::U32(v) => Some(v),
            _ => None,
        }
    }
}

impl FromVariant for i32 {
    const SIGNATURE: &'static str = "i";

    fn from_variant(value: Variant) -> Option<Self> {
        match value {
            Variant::I32(v) => Some(v),
            _ => None,
        }
    }
}

impl FromVariant for ObjectPath {
    const SIGNATURE: &'static str = "o";

    fn from_variant(value: Variant) -> Option<Self> {
        match value {
            Variant::ObjectPath(path) => Some(path),
            _ => None,
        }
    }
}

impl FromVariant for Vec<String> {
    const SIGNATURE: &'static str = "as";

    fn from_variant(value: Variant) -> Option<Self> {
        match value {
            Variant::Array { items, .. } => items.into_iter().map(String::from_variant).collect(),
            _ => None,
        }
    }
}

impl FromVariant for Vec<ObjectPath> {
    const SIGNATURE: &'static str = "ao";

    fn from_variant(value: Variant) -> Option<Self> {
        match value {
            Variant::Array { items, .. } => {
                items.into_iter().map(ObjectPath::from_variant).collect()
            }
            _ => None,
        }
    }
}

/// Decode an already-received variant into `T`.
///
/// `name` only labels the error.
pub fn decode_variant<T: FromVariant>(name: &str, value: Variant) -> Result<T, DecodeError> {
    let value = value.unboxed();
    let found = value.signature();
    if found != T::SIGNATURE {
        return Err(DecodeError::new(name, T::SIGNATURE, found));
    }
    T::from_variant(value).ok_or_else(|| DecodeError::new(name, T::SIGNATURE, found))
}

/// Fetches remote properties and decodes them into typed values.
///
/// One round trip per call, no retries.
pub struct PropertyDecoder<B> {
    bus: Arc<B>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<B> Clone for PropertyDecoder<B> {
    fn clone(&self) -> Self {
        Self {
            bus: Arc::clone(&self.bus),
            diagnostics: Arc::clone(&self.diagnostics),
        }
    }
}

impl<B: Bus> PropertyDecoder<B> {
    pub fn new(bus: Arc<B>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { bus, diagnostics }
    }

    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    pub fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.diagnostics
    }

    /// Fetch `interface.property` from `object` and decode it as `T`.
    pub async fn decode<T: FromVariant>(
        &self,
        ctx: &CallContext,
        object: &BusObject,
        interface: &str,
        property: &str,
    ) -> Result<T> {
        let value = ctx
            .run(async {
                self.bus
                    .get_property(object, interface, property)
                    .await
                    .map_err(|e| GatewayError::bus_call(format!("{}.{}", interface, property), e))
            })
            .await?;

        self.diagnostics
            .property_received(object.path.as_str(), property, &value.signature());

        Ok(decode_variant(property, value)?)
    }
}
