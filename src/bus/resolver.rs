// Sysbus Gateway - Object Resolver
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Name to object path resolution shared by both gateways.

use super::{decode_variant, Bus, BusObject, CallContext, ObjectPath, PropertyDecoder};
use crate::error::{BusError, GatewayError, Result};

/// Resolves remote objects owned by one service.
///
/// The method and property names are supplied by the caller, so the same
/// resolver serves firewalld (`getZoneByName`) and the storage daemon
/// (`Pools`).
pub struct ObjectResolver<B> {
    decoder: PropertyDecoder<B>,
    object: BusObject,
}

impl<B> Clone for ObjectResolver<B> {
    fn clone(&self) -> Self {
        Self {
            decoder: self.decoder.clone(),
            object: self.object.clone(),
        }
    }
}

impl<B: Bus> ObjectResolver<B> {
    /// `object` is where lookups are issued.
    pub fn new(decoder: PropertyDecoder<B>, object: BusObject) -> Self {
        Self { decoder, object }
    }

    pub fn object(&self) -> &BusObject {
        &self.object
    }

    /// Resolve `name` through the lookup method `interface.member`.
    ///
    /// A remote failure is reported as `NotFound`, keeping the remote text.
    pub async fn resolve(
        &self,
        ctx: &CallContext,
        interface: &str,
        member: &str,
        name: &str,
    ) -> Result<BusObject> {
        let not_found = |source: BusError| GatewayError::NotFound {
            name: name.to_string(),
            source,
        };

        self.decoder
            .diagnostics()
            .call_issued(self.object.path.as_str(), interface, member);

        let reply = ctx
            .run(async {
                self.decoder
                    .bus()
                    .call(&self.object, interface, member, vec![name.into()])
                    .await
                    .map_err(not_found)
            })
            .await?;

        let value = reply
            .into_iter()
            .next()
            .ok_or_else(|| not_found(BusError::transport(format!("{} returned no path", member))))?;
        let path: ObjectPath = decode_variant(member, value)?;

        Ok(self.object.sibling(path))
    }

    /// List object paths exposed directly by the `interface.property`
    /// property.
    pub async fn list(
        &self,
        ctx: &CallContext,
        interface: &str,
        property: &str,
    ) -> Result<Vec<BusObject>> {
        let paths: Vec<ObjectPath> = self
            .decoder
            .decode(ctx, &self.object, interface, property)
            .await?;
        Ok(paths.into_iter().map(|p| self.object.sibling(p)).collect())
    }
}
