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

use anyhow::{Context, Result};
use chrono_tz::Tz;
use sdac_core::{ELIA_BASE_URL, TariffConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const ADDON_OPTIONS_PATH: &str = "/data/options.json";
const LOCAL_CONFIG_PATH: &str = "config.toml";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub elia: EliaConfig,

    /// Terms of the custom price and injection formulas
    #[serde(default)]
    pub tariffs: TariffConfig,

    #[serde(default)]
    pub home_assistant: HomeAssistantConfig,

    #[serde(default)]
    pub system: SystemConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliaConfig {
    /// Endpoint the market date is appended to
    #[serde(default = "default_elia_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// IANA timezone that defines the market day
    #[serde(default = "default_market_timezone")]
    pub market_timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeAssistantConfig {
    /// Publish sensor states to Home Assistant
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Falls back to HA_BASE_URL, then to the Supervisor API
    #[serde(default)]
    pub base_url: Option<String>,

    /// Falls back to HA_TOKEN, then to SUPERVISOR_TOKEN
    #[serde(default)]
    pub token: Option<String>,

    /// Entities are named `sensor.<prefix>_<sensor>`
    #[serde(default = "default_entity_prefix")]
    pub entity_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_elia_base_url() -> String {
    ELIA_BASE_URL.to_owned()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_market_timezone() -> String {
    "Europe/Brussels".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_entity_prefix() -> String {
    "sdac_elia".to_owned()
}

fn default_update_interval_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for EliaConfig {
    fn default() -> Self {
        Self {
            base_url: default_elia_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            market_timezone: default_market_timezone(),
        }
    }
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            token: None,
            entity_prefix: default_entity_prefix(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval_secs(),
            log_level: default_log_level(),
        }
    }
}

impl EliaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SystemConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

impl AppConfig {
    /// Load configuration from an explicit file, HA addon options or config.toml
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(
            explicit,
            Path::new(ADDON_OPTIONS_PATH),
            Path::new(LOCAL_CONFIG_PATH),
            |key| std::env::var(key).ok(),
        )
    }

    /// Resolve the first available source: `explicit`, then `options_path`,
    /// then `local_path`, then defaults with overrides from `lookup`
    pub fn load_with(
        explicit: Option<&Path>,
        options_path: &Path,
        local_path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::load_from_path(path)?;
            info!("✅ Loaded configuration from {}", path.display());
            return Ok(config);
        }

        if options_path.exists() {
            let config = Self::load_from_path(options_path)
                .context("Failed to load HA addon options")?;
            info!("✅ Loaded configuration from HA addon options");
            return Ok(config);
        }

        if local_path.exists() {
            let config = Self::load_from_path(local_path)?;
            info!("✅ Loaded configuration from {}", local_path.display());
            return Ok(config);
        }

        warn!("No configuration file found, using defaults with environment overrides");
        let mut config = Self::default();
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML (or `.json`) file and validate it
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: AppConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment-style variables
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("HA_BASE_URL") {
            self.home_assistant.base_url = Some(url);
        }
        if let Some(token) = lookup("HA_TOKEN") {
            self.home_assistant.token = Some(token);
        }
        if let Some(tz) = lookup("SDAC_MARKET_TIMEZONE") {
            self.elia.market_timezone = tz;
        }
        if let Some(secs) = lookup("UPDATE_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            self.system.update_interval_secs = secs;
        }

        let float = |key: &str| lookup(key).and_then(|v| v.parse::<f64>().ok());
        if let Some(v) = float("SDAC_PRICE_FACTOR") {
            self.tariffs.price_factor = v;
        }
        if let Some(v) = float("SDAC_FIXED_PRICE") {
            self.tariffs.fixed_price = v;
        }
        if let Some(v) = float("SDAC_INJECTION_FACTOR") {
            self.tariffs.injection_factor = v;
        }
        if let Some(v) = float("SDAC_FIXED_INJECTION_PRICE") {
            self.tariffs.fixed_injection_price = v;
        }
    }

    /// Parsed `elia.market_timezone`
    pub fn market_timezone(&self) -> Result<Tz> {
        self.elia
            .market_timezone
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown market timezone '{}'", self.elia.market_timezone))
    }

    pub fn validate(&self) -> Result<()> {
        if self.elia.base_url.trim().is_empty() {
            anyhow::bail!("elia.base_url must not be empty");
        }
        if self.elia.request_timeout_secs == 0 {
            anyhow::bail!("elia.request_timeout_secs must be greater than zero");
        }
        self.market_timezone()?;

        if !self.tariffs.is_finite() {
            anyhow::bail!("tariff factors and fixed terms must be finite numbers");
        }

        let prefix = &self.home_assistant.entity_prefix;
        if prefix.is_empty()
            || !prefix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            anyhow::bail!(
                "home_assistant.entity_prefix '{}' may only contain a-z, 0-9 and _",
                prefix
            );
        }

        if self.system.update_interval_secs == 0 {
            anyhow::bail!("system.update_interval_secs must be greater than zero");
        }
        if !LOG_LEVELS.contains(&self.system.log_level.to_lowercase().as_str()) {
            anyhow::bail!(
                "system.log_level '{}' must be one of: {}",
                self.system.log_level,
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }
}
