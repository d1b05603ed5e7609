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

use sdac_core::PriceSnapshot;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::HomeAssistantClient;
use crate::errors::{HaError, HaResult};
use crate::sensors::sensor_states;

/// Pushes coordinator snapshots to Home Assistant as sensor states
#[derive(Debug, Clone)]
pub struct SensorPublisher {
    client: Arc<HomeAssistantClient>,
    entity_prefix: String,
}

impl SensorPublisher {
    /// Publisher naming entities `sensor.<entity_prefix>_<sensor>`
    pub fn new(client: Arc<HomeAssistantClient>, entity_prefix: impl Into<String>) -> Self {
        Self {
            client,
            entity_prefix: entity_prefix.into(),
        }
    }

    /// Publish every sensor, skipping the ones HA rejects
    ///
    /// Returns the number of sensors published. Fails only when none were.
    pub async fn publish(&self, snapshot: &PriceSnapshot) -> HaResult<usize> {
        let states = sensor_states(&self.entity_prefix, snapshot);
        let total = states.len();
        let mut published = 0;

        for sensor in &states {
            match self
                .client
                .set_state(&sensor.entity_id, &sensor.state, &sensor.attributes)
                .await
            {
                Ok(()) => {
                    debug!("📤 [PUBLISH] {} = {}", sensor.entity_id, sensor.state);
                    published += 1;
                }
                Err(e) => {
                    warn!("⚠️ [PUBLISH] Failed to update {}: {}", sensor.entity_id, e);
                }
            }
        }

        if published == 0 {
            return Err(HaError::PublishFailed(total));
        }

        info!(
            "✅ [PUBLISH] Updated {}/{} sensors (slot {})",
            published,
            total,
            snapshot.slot_start.format("%H:%M")
        );
        Ok(published)
    }
}
