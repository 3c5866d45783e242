// Sysbus Gateway - Zone Proxy
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Lazily loaded view of one firewalld zone.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::settings::{ZoneSettingsTuple, ZoneSnapshot, SETTINGS_SIGNATURE};
use super::{members, Interfaces};
use crate::bus::{Bus, BusObject, CallContext, PropertyDecoder};
use crate::error::{DecodeError, GatewayError, Result};
use crate::models::ZoneResponse;

/// A zone whose name is known and whose settings are fetched on demand.
///
/// The first settings accessor issues one `getSettings` call; the decoded
/// snapshot is cached for the lifetime of the proxy. Concurrent accessors
/// on the same proxy wait for that single load instead of issuing their
/// own. A failed or cancelled load leaves the proxy unloaded.
pub struct ZoneObject<B> {
    name: String,
    object: BusObject,
    decoder: PropertyDecoder<B>,
    interfaces: Arc<Interfaces>,
    settings: Mutex<Option<Arc<ZoneSnapshot>>>,
    /// Set once the slot is filled; readable while a load holds the lock.
    loaded: AtomicBool,
}

impl<B: Bus> ZoneObject<B> {
    pub fn new(
        name: impl Into<String>,
        object: BusObject,
        decoder: PropertyDecoder<B>,
        interfaces: Arc<Interfaces>,
    ) -> Self {
        Self {
            name: name.into(),
            object,
            decoder,
            interfaces,
            settings: Mutex::new(None),
            loaded: AtomicBool::new(false),
        }
    }

    /// The zone name. Never touches the bus.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object(&self) -> &BusObject {
        &self.object
    }

    /// Whether the settings snapshot has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// The settings snapshot, loading it on first use.
    pub async fn settings(&self, ctx: &CallContext) -> Result<Arc<ZoneSnapshot>> {
        let mut slot = ctx.run(async { Ok(self.settings.lock().await) }).await?;
        if let Some(snapshot) = slot.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let snapshot = Arc::new(self.load(ctx).await?);
        *slot = Some(Arc::clone(&snapshot));
        self.loaded.store(true, Ordering::Release);
        Ok(snapshot)
    }

    pub async fn description(&self, ctx: &CallContext) -> Result<String> {
        Ok(self.settings(ctx).await?.description.clone())
    }

    pub async fn target(&self, ctx: &CallContext) -> Result<String> {
        Ok(self.settings(ctx).await?.target.clone())
    }

    pub async fn services(&self, ctx: &CallContext) -> Result<BTreeSet<String>> {
        Ok(self.settings(ctx).await?.services.clone())
    }

    /// Ports in `port/protocol` form.
    pub async fn ports(&self, ctx: &CallContext) -> Result<Vec<String>> {
        Ok(self.settings(ctx).await?.ports.clone())
    }

    pub async fn rich_rules(&self, ctx: &CallContext) -> Result<Vec<String>> {
        Ok(self.settings(ctx).await?.rich_rules.clone())
    }

    /// Read the zone's `name` property from firewalld, uncached.
    pub async fn remote_name(&self, ctx: &CallContext) -> Result<String> {
        self.decoder
            .decode(ctx, &self.object, &self.interfaces.zone, members::NAME)
            .await
    }

    /// Build the JSON representation from one snapshot.
    pub async fn to_response(&self, ctx: &CallContext) -> Result<ZoneResponse> {
        let snapshot = self.settings(ctx).await?;
        Ok(ZoneResponse {
            name: self.name.clone(),
            description: snapshot.description.clone(),
            target: snapshot.target.clone(),
            services: snapshot.services.iter().cloned().collect(),
            ports: snapshot.ports.clone(),
            rich_rules: snapshot.rich_rules.clone(),
        })
    }

    async fn load(&self, ctx: &CallContext) -> Result<ZoneSnapshot> {
        let path = self.object.path.as_str();
        let interface = self.interfaces.config_zone.as_str();
        let diagnostics = self.decoder.diagnostics();

        diagnostics.call_issued(path, interface, members::GET_SETTINGS);
        let reply = ctx
            .run(async {
                self.decoder
                    .bus()
                    .call(&self.object, interface, members::GET_SETTINGS, Vec::new())
                    .await
                    .map_err(|e| GatewayError::bus_call(members::GET_SETTINGS, e))
            })
            .await?;

        let value = reply
            .into_iter()
            .next()
            .ok_or_else(|| DecodeError::new(members::GET_SETTINGS, SETTINGS_SIGNATURE, ""))?;
        diagnostics.property_received(path, members::GET_SETTINGS, &value.signature());

        let decoded = ZoneSettingsTuple::decode(value)?;
        for defaulted in &decoded.defaulted {
            diagnostics.field_defaulted(path, defaulted.field, &defaulted.reason);
        }
        debug!(
            zone = %self.name,
            fields = decoded.received,
            "Loaded zone settings"
        );

        Ok(ZoneSnapshot::from(decoded.tuple))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bus::testing::{FakeBus, RecordingDiagnostics};
    use crate::bus::{NoopDiagnostics, Variant};
    use crate::error::{BusError, CancelReason};
    use crate::firewall::{ZoneSettings, BUS_NAME};
    use crate::models::PortPair;

    const ZONE_PATH: &str = "/org/fedoraproject/FirewallD1/config/zone/1";

    fn public_settings() -> ZoneSettingsTuple {
        ZoneSettingsTuple {
            services: vec!["ssh".to_string(), "dhcpv6-client".to_string()],
            ports: vec![PortPair::new("8080", "tcp")],
            rich_rules: vec!["rule service name=\"http\" accept".to_string()],
            ..ZoneSettingsTuple::for_new_zone("public", &ZoneSettings::new("Public", ""))
        }
    }

    fn zone(bus: Arc<FakeBus>) -> ZoneObject<FakeBus> {
        let decoder = PropertyDecoder::new(bus, Arc::new(NoopDiagnostics));
        ZoneObject::new(
            "public",
            BusObject::new(BUS_NAME, ZONE_PATH),
            decoder,
            Arc::new(Interfaces::default()),
        )
    }

    fn truncated(tuple: &ZoneSettingsTuple, len: usize) -> Variant {
        match tuple.encode() {
            Variant::Struct(mut fields) => {
                fields.truncate(len);
                Variant::Struct(fields)
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_name_does_not_load() {
        let bus = Arc::new(FakeBus::new());
        let zone = zone(bus.clone());
        assert_eq!(zone.name(), "public");
        assert!(!zone.is_loaded());
        assert!(bus.calls().is_empty());
    }

    #[tokio::test]
    async fn test_accessors_share_one_load() {
        let bus = Arc::new(FakeBus::new());
        bus.on_call(ZONE_PATH, "getSettings", Ok(vec![public_settings().encode()]));
        let zone = zone(bus.clone());
        let ctx = CallContext::new();

        assert_eq!(zone.description(&ctx).await.unwrap(), "Public");
        assert_eq!(zone.target(&ctx).await.unwrap(), "default");
        assert!(zone.services(&ctx).await.unwrap().contains("ssh"));
        assert_eq!(zone.ports(&ctx).await.unwrap(), vec!["8080/tcp"]);
        assert_eq!(zone.rich_rules(&ctx).await.unwrap().len(), 1);

        assert!(zone.is_loaded());
        assert_eq!(bus.count("getSettings"), 1);
        let call = &bus.calls()[0];
        assert_eq!(call.interface, "org.fedoraproject.FirewallD1.config.zone");
        assert!(call.args.is_empty());
    }

    #[tokio::test]
    async fn test_is_loaded_while_settings_are_locked() {
        let bus = Arc::new(FakeBus::new());
        bus.on_call(ZONE_PATH, "getSettings", Ok(vec![public_settings().encode()]));
        let zone = zone(bus.clone());
        zone.settings(&CallContext::new()).await.unwrap();

        let _guard = zone.settings.lock().await;
        assert!(zone.is_loaded());
    }

    #[tokio::test]
    async fn test_is_not_loaded_while_first_load_is_in_flight() {
        let bus = Arc::new(FakeBus::new());
        let zone = zone(bus.clone());

        let _guard = zone.settings.lock().await;
        assert!(!zone.is_loaded());
        assert!(bus.calls().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_accessors_load_once() {
        let bus = Arc::new(FakeBus::with_delay(Duration::from_millis(50)));
        bus.on_call(ZONE_PATH, "getSettings", Ok(vec![public_settings().encode()]));
        let zone = Arc::new(zone(bus.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let zone = Arc::clone(&zone);
                tokio::spawn(async move { zone.settings(&CallContext::new()).await })
            })
            .collect();

        let mut snapshots = Vec::new();
        for handle in handles {
            snapshots.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(bus.count("getSettings"), 1);
        assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_load_leaves_proxy_unloaded() {
        let bus = Arc::new(FakeBus::with_delay(Duration::from_secs(1)));
        bus.on_call(ZONE_PATH, "getSettings", Ok(vec![public_settings().encode()]));
        let zone = zone(bus.clone());

        let err = zone
            .description(&CallContext::with_timeout(Duration::from_millis(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Cancelled(CancelReason::DeadlineExceeded)));
        assert!(!zone.is_loaded());

        assert_eq!(zone.description(&CallContext::new()).await.unwrap(), "Public");
        assert_eq!(bus.count("getSettings"), 2);
    }

    #[tokio::test]
    async fn test_load_failure_reaches_every_accessor() {
        let bus = Arc::new(FakeBus::new());
        bus.on_call(
            ZONE_PATH,
            "getSettings",
            Err(BusError::remote("org.fedoraproject.FirewallD1.Exception", "INVALID_ZONE")),
        );
        let zone = zone(bus.clone());
        let ctx = CallContext::new();

        for err in [
            zone.description(&ctx).await.unwrap_err(),
            zone.rich_rules(&ctx).await.unwrap_err(),
        ] {
            assert_eq!(err.bus_error().map(|e| e.message.as_str()), Some("INVALID_ZONE"));
        }
        assert!(!zone.is_loaded());
        assert_eq!(zone.name(), "public");
    }

    #[tokio::test]
    async fn test_short_tuple_defaults_rich_rules() {
        let bus = Arc::new(FakeBus::new());
        bus.on_call(ZONE_PATH, "getSettings", Ok(vec![truncated(&public_settings(), 12)]));
        let zone = zone(bus);
        let ctx = CallContext::new();

        assert!(zone.rich_rules(&ctx).await.unwrap().is_empty());
        assert_eq!(zone.ports(&ctx).await.unwrap(), vec!["8080/tcp"]);
        assert_eq!(zone.name(), "public");
    }

    #[tokio::test]
    async fn test_defaulted_fields_are_reported() {
        let bus = Arc::new(FakeBus::new());
        let mut fields = match public_settings().encode() {
            Variant::Struct(fields) => fields,
            _ => unreachable!(),
        };
        fields[5] = Variant::U32(3);
        bus.on_call(ZONE_PATH, "getSettings", Ok(vec![Variant::Struct(fields)]));

        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let zone = ZoneObject::new(
            "public",
            BusObject::new(BUS_NAME, ZONE_PATH),
            PropertyDecoder::new(bus, diagnostics.clone()),
            Arc::new(Interfaces::default()),
        );

        assert!(zone.services(&CallContext::new()).await.unwrap().is_empty());
        let defaulted = diagnostics.defaulted();
        assert_eq!(defaulted.len(), 1);
        assert_eq!(defaulted[0].0, "services");
    }

    #[tokio::test]
    async fn test_malformed_reply_is_decode_error() {
        let bus = Arc::new(FakeBus::new());
        bus.on_call(ZONE_PATH, "getSettings", Ok(vec![Variant::from("garbage")]));
        let zone = zone(bus);

        let err = zone.target(&CallContext::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
        assert!(!zone.is_loaded());
    }

    #[tokio::test]
    async fn test_to_response_and_remote_name() {
        let bus = Arc::new(FakeBus::new());
        bus.on_call(ZONE_PATH, "getSettings", Ok(vec![public_settings().encode()]));
        bus.set_property(ZONE_PATH, "name", Variant::from("public"));
        let zone = zone(bus);
        let ctx = CallContext::new();

        let response = zone.to_response(&ctx).await.unwrap();
        assert_eq!(response.name, "public");
        assert_eq!(response.services, vec!["dhcpv6-client", "ssh"]);
        assert_eq!(response.ports, vec!["8080/tcp"]);
        assert_eq!(zone.remote_name(&ctx).await.unwrap(), "public");
    }
}
