// Sysbus Gateway - Main Entry Point
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Sysbus Gateway - inspect firewalld zones and ZFS pools over D-Bus.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use sysbus_gateway::bus::{default_diagnostics, CallContext, ZbusBus};
use sysbus_gateway::config::{BusKind, Settings};
use sysbus_gateway::firewall::FirewallGateway;
use sysbus_gateway::storage::StorageGateway;
use sysbus_gateway::GatewayError;

#[derive(Debug, Parser)]
#[command(name = "sysbus-gateway", version, about = "Query firewalld and the ZFS daemon over D-Bus")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every firewall zone with its settings
    Zones,
    /// Show one firewall zone
    Zone {
        /// Zone name
        name: String,
    },
    /// List storage pools
    Pools,
    /// Show firewalld and ZFS daemon versions
    Version,
}

#[derive(Debug, Serialize)]
struct Versions {
    firewall: Option<String>,
    storage: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    debug!("Using settings from {}", settings.path().display());

    let bus = match settings.bus() {
        BusKind::System => ZbusBus::system().await,
        BusKind::Session => ZbusBus::session().await,
    }
    .context("Failed to connect to D-Bus")?;
    let bus = Arc::new(bus);

    let ctx = match settings.call_timeout() {
        Some(timeout) => CallContext::with_timeout(timeout),
        None => CallContext::new(),
    };

    let firewall = FirewallGateway::new(Arc::clone(&bus), settings.firewall(), default_diagnostics());
    let storage = StorageGateway::new(bus, settings.storage(), default_diagnostics());

    match cli.command {
        Command::Zones => {
            let zones = firewall.list_zones(&ctx).await.context("Failed to list zones")?;
            let mut responses = Vec::with_capacity(zones.len());
            for zone in &zones {
                responses.push(
                    zone.to_response(&ctx)
                        .await
                        .with_context(|| format!("Failed to load zone {}", zone.name()))?,
                );
            }
            print_json(&responses)
        }
        Command::Zone { name } => {
            let zone = firewall
                .get_zone(&ctx, &name)
                .await
                .with_context(|| format!("Failed to resolve zone {}", name))?;
            print_json(&zone.to_response(&ctx).await?)
        }
        Command::Pools => {
            let pools = storage.list_pools(&ctx).await.context("Failed to list pools")?;
            let mut responses = Vec::with_capacity(pools.len());
            for pool in &pools {
                responses.push(pool.to_response(&ctx).await?);
            }
            print_json(&responses)
        }
        Command::Version => {
            let versions = Versions {
                firewall: available("firewalld", firewall.connect(&ctx).await),
                storage: available("ZFS daemon", storage.connect(&ctx).await),
            };
            print_json(&versions)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Keep a version if the service answered, logging why it did not.
fn available(service: &str, result: Result<String, GatewayError>) -> Option<String> {
    match result {
        Ok(version) => Some(version),
        Err(e) => {
            warn!("{} unavailable: {}", service, e);
            None
        }
    }
}
