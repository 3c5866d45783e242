// Sysbus Gateway - Firewall Gateway
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Zone and rule lifecycle operations against firewalld.

use std::sync::Arc;

use tracing::{debug, info};

use super::settings::{ZoneSettings, ZoneSettingsTuple};
use super::zone::ZoneObject;
use super::{members, paths, Interfaces};
use crate::bus::{
    decode_variant, Bus, BusObject, CallContext, Diagnostics, ObjectPath, ObjectResolver,
    PropertyDecoder, Variant,
};
use crate::config::FirewallService;
use crate::error::{BusError, DecodeError, GatewayError, Result};
use crate::models::{PortPair, Rule};

/// Timeout argument for runtime additions; zero means permanent for the
/// lifetime of the runtime configuration.
const NO_TIMEOUT: i32 = 0;

/// Gateway to firewalld.
///
/// Construction never touches the bus. Every operation takes a
/// [`CallContext`] and fails with `Cancelled` if it is cancelled or times
/// out. Nothing is retried.
pub struct FirewallGateway<B> {
    decoder: PropertyDecoder<B>,
    root: BusObject,
    resolver: ObjectResolver<B>,
    interfaces: Arc<Interfaces>,
}

impl<B: Bus> FirewallGateway<B> {
    pub fn new(bus: Arc<B>, service: &FirewallService, diagnostics: Arc<dyn Diagnostics>) -> Self {
        let decoder = PropertyDecoder::new(bus, diagnostics);
        let root = BusObject::new(service.destination.as_str(), service.path.as_str());
        let config = root.sibling(ObjectPath::new(format!(
            "{}{}",
            service.path.trim_end_matches('/'),
            paths::CONFIG_SUFFIX
        )));

        Self {
            resolver: ObjectResolver::new(decoder.clone(), config),
            decoder,
            root,
            interfaces: Arc::new(Interfaces::from_prefix(&service.prefix)),
        }
    }

    pub fn interfaces(&self) -> &Interfaces {
        &self.interfaces
    }

    /// Verify firewalld is reachable by reading its version.
    pub async fn connect(&self, ctx: &CallContext) -> Result<String> {
        info!("Connecting to firewalld...");
        let version = self.version(ctx).await?;
        info!("Connected to firewalld {}", version);
        Ok(version)
    }

    /// The firewalld version string.
    pub async fn version(&self, ctx: &CallContext) -> Result<String> {
        self.decoder
            .decode(ctx, &self.root, &self.interfaces.main, members::VERSION)
            .await
    }

    /// All zones, in the order firewalld reports them.
    pub async fn list_zones(&self, ctx: &CallContext) -> Result<Vec<ZoneObject<B>>> {
        // `<prefix>.zone.getZones`, not `<prefix>.getZones`.
        let reply = self
            .call(
                ctx,
                &self.root,
                &self.interfaces.zone,
                members::GET_ZONES,
                Vec::new(),
                |e| GatewayError::bus_call(members::GET_ZONES, e),
            )
            .await?;
        let value = reply
            .into_iter()
            .next()
            .ok_or_else(|| DecodeError::new(members::GET_ZONES, "as", ""))?;
        let names: Vec<String> = decode_variant(members::GET_ZONES, value)?;
        debug!("Received firewall zones: {:?}", names);

        let mut zones = Vec::with_capacity(names.len());
        for name in names {
            zones.push(self.get_zone(ctx, &name).await?);
        }

        info!("Listed {} zones", zones.len());
        Ok(zones)
    }

    /// Resolve a zone by name.
    pub async fn get_zone(&self, ctx: &CallContext, name: &str) -> Result<ZoneObject<B>> {
        let object = self
            .resolver
            .resolve(ctx, &self.interfaces.config, members::GET_ZONE_BY_NAME, name)
            .await?;
        Ok(ZoneObject::new(
            name,
            object,
            self.decoder.clone(),
            Arc::clone(&self.interfaces),
        ))
    }

    /// Create a zone in the permanent configuration.
    pub async fn add_zone(&self, ctx: &CallContext, name: &str, settings: &ZoneSettings) -> Result<()> {
        let tuple = ZoneSettingsTuple::for_new_zone(name, settings);
        self.call(
            ctx,
            self.resolver.object(),
            &self.interfaces.config,
            members::ADD_ZONE,
            vec![name.into(), tuple.encode()],
            conflict_or_call(name.to_string(), members::ADD_ZONE),
        )
        .await?;

        info!("Added zone {}", name);
        Ok(())
    }

    pub async fn remove_zone(&self, ctx: &CallContext, name: &str) -> Result<()> {
        self.call(
            ctx,
            self.resolver.object(),
            &self.interfaces.config,
            members::REMOVE_ZONE,
            vec![name.into()],
            |e| GatewayError::bus_call(members::REMOVE_ZONE, e),
        )
        .await?;

        info!("Removed zone {}", name);
        Ok(())
    }

    pub async fn add_rich_rule(&self, ctx: &CallContext, zone: &str, rule: &str) -> Result<()> {
        self.add_entry(ctx, members::ADD_RICH_RULE, zone, rule).await?;
        info!("Added rich rule to zone {}: {}", zone, rule);
        Ok(())
    }

    pub async fn remove_rich_rule(&self, ctx: &CallContext, zone: &str, rule: &str) -> Result<()> {
        self.remove_entry(ctx, members::REMOVE_RICH_RULE, zone, rule).await?;
        info!("Removed rich rule from zone {}: {}", zone, rule);
        Ok(())
    }

    pub async fn add_port(&self, ctx: &CallContext, zone: &str, port: &str, protocol: &str) -> Result<()> {
        let entry = PortPair::new(port, protocol).display_string();
        self.add_entry(ctx, members::ADD_PORT, zone, &entry).await?;
        info!("Added port {} to zone {}", entry, zone);
        Ok(())
    }

    pub async fn remove_port(&self, ctx: &CallContext, zone: &str, port: &str, protocol: &str) -> Result<()> {
        let entry = PortPair::new(port, protocol).display_string();
        self.remove_entry(ctx, members::REMOVE_PORT, zone, &entry).await?;
        info!("Removed port {} from zone {}", entry, zone);
        Ok(())
    }

    pub async fn add_service(&self, ctx: &CallContext, zone: &str, service: &str) -> Result<()> {
        self.add_entry(ctx, members::ADD_SERVICE, zone, service).await?;
        info!("Enabled service {} in zone {}", service, zone);
        Ok(())
    }

    pub async fn remove_service(&self, ctx: &CallContext, zone: &str, service: &str) -> Result<()> {
        self.remove_entry(ctx, members::REMOVE_SERVICE, zone, service).await?;
        info!("Disabled service {} in zone {}", service, zone);
        Ok(())
    }

    /// Apply `rule` to `zone`. The rule is not validated here.
    pub async fn add_rule(&self, ctx: &CallContext, zone: &str, rule: &Rule) -> Result<()> {
        match rule {
            Rule::Rich { rule } => self.add_rich_rule(ctx, zone, rule).await,
            Rule::Port { port, protocol } => self.add_port(ctx, zone, port, protocol).await,
            Rule::Service { service } => self.add_service(ctx, zone, service).await,
        }
    }

    pub async fn remove_rule(&self, ctx: &CallContext, zone: &str, rule: &Rule) -> Result<()> {
        match rule {
            Rule::Rich { rule } => self.remove_rich_rule(ctx, zone, rule).await,
            Rule::Port { port, protocol } => self.remove_port(ctx, zone, port, protocol).await,
            Rule::Service { service } => self.remove_service(ctx, zone, service).await,
        }
    }

    async fn add_entry(&self, ctx: &CallContext, member: &'static str, zone: &str, entry: &str) -> Result<()> {
        self.call(
            ctx,
            &self.root,
            &self.interfaces.zone,
            member,
            vec![zone.into(), entry.into(), NO_TIMEOUT.into()],
            conflict_or_call(format!("{} in zone {}", entry, zone), member),
        )
        .await?;
        Ok(())
    }

    async fn remove_entry(&self, ctx: &CallContext, member: &'static str, zone: &str, entry: &str) -> Result<()> {
        self.call(
            ctx,
            &self.root,
            &self.interfaces.zone,
            member,
            vec![zone.into(), entry.into()],
            |e| GatewayError::bus_call(member, e),
        )
        .await?;
        Ok(())
    }

    async fn call<F>(
        &self,
        ctx: &CallContext,
        object: &BusObject,
        interface: &str,
        member: &str,
        args: Vec<Variant>,
        on_error: F,
    ) -> Result<Vec<Variant>>
    where
        F: FnOnce(BusError) -> GatewayError,
    {
        self.decoder
            .diagnostics()
            .call_issued(object.path.as_str(), interface, member);
        ctx.run(async {
            self.decoder
                .bus()
                .call(object, interface, member, args)
                .await
                .map_err(on_error)
        })
        .await
    }
}

/// Classify a rejected creation: `NAME_CONFLICT`/`ALREADY_ENABLED` become
/// `Conflict`, anything else stays a bus call failure.
fn conflict_or_call(name: String, member: &'static str) -> impl FnOnce(BusError) -> GatewayError {
    move |source| {
        if source.is_conflict() {
            GatewayError::Conflict { name, source }
        } else {
            GatewayError::bus_call(member, source)
        }
    }
}
