// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SDAC Elia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! SDAC Elia - entry point of the price service

mod cli;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use sdac_core::{EliaClient, PriceCoordinator, PriceSnapshot, PriceSource};
use sdac_ha::{HomeAssistantClient, SensorPublisher};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use cli::{Cli, Commands, ShowArgs};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log = logging::init();

    let config = AppConfig::load(cli.config.as_deref())?;
    log.apply_level(&config.system.log_level)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config).await,
        Commands::Show(args) => show(&config, &args).await,
    }
}

fn elia_client(config: &AppConfig) -> Result<EliaClient> {
    EliaClient::new(config.elia.base_url.clone(), config.elia.request_timeout())
        .context("Failed to create Elia client")
}

fn coordinator(config: &AppConfig) -> Result<PriceCoordinator> {
    Ok(PriceCoordinator::new(
        Arc::new(elia_client(config)?),
        config.tariffs,
        config.market_timezone()?,
    ))
}

async fn publisher(config: &AppConfig) -> Result<Option<SensorPublisher>> {
    let ha = &config.home_assistant;
    if !ha.enabled {
        info!("Home Assistant publishing disabled, readings are only logged");
        return Ok(None);
    }

    let client = HomeAssistantClient::from_config(ha.base_url.clone(), ha.token.clone())
        .context("Failed to create Home Assistant client")?;
    if !client.ping().await? {
        warn!(
            "Home Assistant at {} is not reachable yet, will keep trying on every update",
            client.base_url()
        );
    }

    Ok(Some(SensorPublisher::new(
        Arc::new(client),
        ha.entity_prefix.clone(),
    )))
}

async fn run(config: &AppConfig) -> Result<()> {
    info!(
        "Starting SDAC Elia v{} (update every {}s, market timezone {})",
        env!("CARGO_PKG_VERSION"),
        config.system.update_interval_secs,
        config.elia.market_timezone
    );

    let coordinator = coordinator(config)?;
    let publisher = publisher(config).await?;

    let mut interval = tokio::time::interval(config.system.update_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("Shutdown signal received, stopping");
                break;
            }
            _ = interval.tick() => {
                let snapshot = coordinator.refresh().await;
                log_snapshot(&snapshot);

                if let Some(publisher) = &publisher
                    && let Err(e) = publisher.publish(&snapshot).await
                {
                    error!("Failed to publish sensor states: {e}");
                }
            }
        }
    }

    Ok(())
}

async fn show(config: &AppConfig, args: &ShowArgs) -> Result<()> {
    let output = match args.date {
        Some(date) => {
            let prices = elia_client(config)?
                .fetch_day(date)
                .await
                .with_context(|| format!("Failed to fetch Elia prices for {date}"))?;
            serde_json::to_string_pretty(&prices)?
        }
        None => {
            let snapshot = coordinator(config)?.refresh().await;
            if snapshot.last_fetch_time.is_none() {
                anyhow::bail!("No prices could be fetched from Elia");
            }
            serde_json::to_string_pretty(&snapshot)?
        }
    };

    println!("{output}");
    Ok(())
}

fn log_snapshot(snapshot: &PriceSnapshot) {
    let slot = snapshot.slot_start.format("%Y-%m-%d %H:%M UTC");
    match (snapshot.sdac_price, snapshot.derived) {
        (Some(sdac), Some(derived)) => info!(
            "{}: SDAC {:.2}, Ecopower {:.2}/{:.2}, custom {:.2}/{:.2} EUR/MWh",
            slot,
            sdac,
            derived.ecopower_price,
            derived.ecopower_injection,
            derived.custom_price,
            derived.custom_injection
        ),
        _ => warn!("{}: no SDAC price available", slot),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
