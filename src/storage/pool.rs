// Sysbus Gateway - Pool Proxy
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::{properties, Interfaces};
use crate::bus::{Bus, BusObject, CallContext, PropertyDecoder};
use crate::error::Result;
use crate::models::PoolResponse;

/// A storage pool exposed by the ZFS daemon.
///
/// The name is read on every call; nothing is cached.
pub struct PoolObject<B> {
    object: BusObject,
    decoder: PropertyDecoder<B>,
    interfaces: Arc<Interfaces>,
}

impl<B: Bus> PoolObject<B> {
    pub fn new(object: BusObject, decoder: PropertyDecoder<B>, interfaces: Arc<Interfaces>) -> Self {
        Self {
            object,
            decoder,
            interfaces,
        }
    }

    pub fn object(&self) -> &BusObject {
        &self.object
    }

    pub async fn name(&self, ctx: &CallContext) -> Result<String> {
        self.decoder
            .decode(ctx, &self.object, &self.interfaces.pool, properties::NAME)
            .await
    }

    pub async fn to_response(&self, ctx: &CallContext) -> Result<PoolResponse> {
        Ok(PoolResponse {
            name: self.name(ctx).await?,
        })
    }
}
