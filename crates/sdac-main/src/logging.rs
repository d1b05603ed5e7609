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

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

/// Lets the configured log level replace the startup filter once config is loaded
#[derive(Debug)]
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

/// Install the fmt subscriber. `RUST_LOG` wins over everything else.
pub fn init() -> LogHandle {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new("info"), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    LogHandle { handle, from_env }
}

impl LogHandle {
    pub fn apply_level(&self, level: &str) -> Result<()> {
        if self.from_env {
            debug!("RUST_LOG is set, ignoring configured log level '{}'", level);
            return Ok(());
        }
        self.handle.reload(EnvFilter::new(level.to_lowercase()))?;
        Ok(())
    }
}
