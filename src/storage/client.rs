// Sysbus Gateway - Storage Gateway
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Pool listing and version queries against the ZFS daemon.

use std::sync::Arc;

use tracing::info;

use super::pool::PoolObject;
use super::{properties, Interfaces};
use crate::bus::{Bus, BusObject, CallContext, Diagnostics, ObjectResolver, PropertyDecoder};
use crate::config::StorageService;
use crate::error::Result;

/// Gateway to the ZFS daemon.
pub struct StorageGateway<B> {
    decoder: PropertyDecoder<B>,
    resolver: ObjectResolver<B>,
    interfaces: Arc<Interfaces>,
}

impl<B: Bus> StorageGateway<B> {
    pub fn new(bus: Arc<B>, service: &StorageService, diagnostics: Arc<dyn Diagnostics>) -> Self {
        let decoder = PropertyDecoder::new(bus, diagnostics);
        let root = BusObject::new(service.destination.as_str(), service.path.as_str());
        Self {
            resolver: ObjectResolver::new(decoder.clone(), root),
            decoder,
            interfaces: Arc::new(Interfaces::from_prefix(&service.prefix)),
        }
    }

    /// Verify the daemon is reachable by reading its version.
    pub async fn connect(&self, ctx: &CallContext) -> Result<String> {
        info!("Connecting to ZFS daemon...");
        let version = self.version(ctx).await?;
        info!("Connected to ZFS daemon {}", version);
        Ok(version)
    }

    pub async fn version(&self, ctx: &CallContext) -> Result<String> {
        self.decoder
            .decode(ctx, self.resolver.object(), &self.interfaces.main, properties::VERSION)
            .await
    }

    /// Every pool the daemon exposes, in the order it reports them.
    pub async fn list_pools(&self, ctx: &CallContext) -> Result<Vec<PoolObject<B>>> {
        let objects = self
            .resolver
            .list(ctx, &self.interfaces.main, properties::POOLS)
            .await?;

        info!("Listed {} pools", objects.len());
        Ok(objects
            .into_iter()
            .map(|object| PoolObject::new(object, self.decoder.clone(), Arc::clone(&self.interfaces)))
            .collect())
    }
}
