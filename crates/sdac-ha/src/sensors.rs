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

//! Sensor entities exposed to Home Assistant
//!
//! Every sensor is a pure view over a [`PriceSnapshot`]; only the main
//! SDAC sensor carries the day's price table.

use sdac_core::PriceSnapshot;
use serde_json::{Map, Value, json};

pub const UNIT_EUR_PER_MWH: &str = "€/MWh";
const UNKNOWN_STATE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    SdacPrice,
    EcopowerPrice,
    EcopowerInjectionTariff,
    CustomPrice,
    CustomInjectionTariff,
}

impl SensorKind {
    pub const ALL: [SensorKind; 5] = [
        SensorKind::SdacPrice,
        SensorKind::EcopowerPrice,
        SensorKind::EcopowerInjectionTariff,
        SensorKind::CustomPrice,
        SensorKind::CustomInjectionTariff,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::SdacPrice => "sdac_price",
            Self::EcopowerPrice => "ecopower_price",
            Self::EcopowerInjectionTariff => "ecopower_injection_tariff",
            Self::CustomPrice => "custom_price",
            Self::CustomInjectionTariff => "custom_injection_tariff",
        }
    }

    pub fn friendly_name(self) -> &'static str {
        match self {
            Self::SdacPrice => "Elia SDAC price",
            Self::EcopowerPrice => "Ecopower price",
            Self::EcopowerInjectionTariff => "Ecopower injection tariff",
            Self::CustomPrice => "Custom price",
            Self::CustomInjectionTariff => "Custom injection tariff",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::SdacPrice => "mdi:chart-line",
            Self::EcopowerPrice | Self::CustomPrice => "mdi:transmission-tower-import",
            Self::EcopowerInjectionTariff | Self::CustomInjectionTariff => {
                "mdi:transmission-tower-export"
            }
        }
    }

    pub fn entity_id(self, prefix: &str) -> String {
        format!("sensor.{}_{}", prefix, self.key())
    }

    /// Reading shown by this sensor, `None` when the block has no price
    pub fn value(self, snapshot: &PriceSnapshot) -> Option<f64> {
        match self {
            Self::SdacPrice => snapshot.sdac_price,
            Self::EcopowerPrice => snapshot.derived.map(|d| d.ecopower_price),
            Self::EcopowerInjectionTariff => snapshot.derived.map(|d| d.ecopower_injection),
            Self::CustomPrice => snapshot.derived.map(|d| d.custom_price),
            Self::CustomInjectionTariff => snapshot.derived.map(|d| d.custom_injection),
        }
    }
}

/// State and attributes of one entity, ready to be posted
#[derive(Debug, Clone, PartialEq)]
pub struct SensorState {
    pub kind: SensorKind,
    pub entity_id: String,
    pub state: String,
    pub attributes: Map<String, Value>,
}

impl SensorState {
    pub fn from_snapshot(kind: SensorKind, prefix: &str, snapshot: &PriceSnapshot) -> Self {
        let state = kind
            .value(snapshot)
            .map_or_else(|| UNKNOWN_STATE.to_owned(), |v| format!("{v:.2}"));

        let mut attributes = Map::new();
        attributes.insert("friendly_name".to_owned(), json!(kind.friendly_name()));
        attributes.insert("unit_of_measurement".to_owned(), json!(UNIT_EUR_PER_MWH));
        attributes.insert("state_class".to_owned(), json!("measurement"));
        attributes.insert("icon".to_owned(), json!(kind.icon()));

        if kind == SensorKind::SdacPrice {
            attributes.insert("prices".to_owned(), json!(snapshot.prices));
            attributes.insert(
                "last_fetch_time".to_owned(),
                json!(snapshot.last_fetch_time.map(|t| t.to_rfc3339())),
            );
            attributes.insert("slot_start".to_owned(), json!(snapshot.slot_start));
        }

        Self {
            kind,
            entity_id: kind.entity_id(prefix),
            state,
            attributes,
        }
    }
}

/// States of all sensors for one snapshot
pub fn sensor_states(prefix: &str, snapshot: &PriceSnapshot) -> Vec<SensorState> {
    SensorKind::ALL
        .iter()
        .map(|kind| SensorState::from_snapshot(*kind, prefix, snapshot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sdac_core::{DerivedPrices, PricePoint, TariffConfig};

    fn snapshot(sdac: Option<f64>) -> PriceSnapshot {
        let slot = Utc.with_ymd_and_hms(2025, 10, 2, 13, 0, 0).unwrap();
        let tariffs = TariffConfig {
            price_factor: 1.1,
            fixed_price: 0.02,
            injection_factor: 1.0,
            fixed_injection_price: 0.01,
        };
        PriceSnapshot {
            slot_start: slot,
            sdac_price: sdac,
            derived: sdac.map(|p| DerivedPrices::compute(p, &tariffs)),
            prices: vec![PricePoint {
                time: slot,
                price: sdac.unwrap_or(12.5),
            }],
            market_date: Some(slot.date_naive()),
            last_fetch_time: Some(Utc.with_ymd_and_hms(2025, 10, 1, 22, 0, 3).unwrap()),
        }
    }

    #[test]
    fn test_entity_ids() {
        let ids: Vec<String> = SensorKind::ALL
            .iter()
            .map(|k| k.entity_id("sdac_elia"))
            .collect();
        assert_eq!(
            ids,
            vec![
                "sensor.sdac_elia_sdac_price",
                "sensor.sdac_elia_ecopower_price",
                "sensor.sdac_elia_ecopower_injection_tariff",
                "sensor.sdac_elia_custom_price",
                "sensor.sdac_elia_custom_injection_tariff",
            ]
        );
    }

    #[test]
    fn test_states_from_snapshot() {
        let states = sensor_states("sdac_elia", &snapshot(Some(50.0)));
        let values: Vec<&str> = states.iter().map(|s| s.state.as_str()).collect();
        // custom: (1.1*50 + 0.02)*1000 and (50 - 0.01)*1000
        assert_eq!(
            values,
            vec!["50.00", "55.00", "34.00", "55020.00", "49990.00"]
        );
    }

    #[test]
    fn test_missing_reading_is_unknown() {
        let states = sensor_states("sdac_elia", &snapshot(None));
        assert!(states.iter().all(|s| s.state == "unknown"));
    }

    #[test]
    fn test_only_main_sensor_has_price_table() {
        let states = sensor_states("sdac_elia", &snapshot(Some(50.0)));

        let main = &states[0];
        assert_eq!(main.kind, SensorKind::SdacPrice);
        assert_eq!(main.attributes["prices"][0]["time"], "2025-10-02T13:00:00Z");
        assert_eq!(main.attributes["prices"][0]["price"], 50.0);
        assert_eq!(
            main.attributes["last_fetch_time"],
            "2025-10-01T22:00:03+00:00"
        );
        assert_eq!(main.attributes["unit_of_measurement"], UNIT_EUR_PER_MWH);

        for other in &states[1..] {
            assert!(!other.attributes.contains_key("prices"));
            assert!(!other.attributes.contains_key("last_fetch_time"));
            assert_eq!(other.attributes["state_class"], "measurement");
        }
    }

    #[test]
    fn test_never_fetched_has_null_fetch_time() {
        let mut snap = snapshot(None);
        snap.last_fetch_time = None;
        let main = SensorState::from_snapshot(SensorKind::SdacPrice, "x", &snap);
        assert!(main.attributes["last_fetch_time"].is_null());
    }
}
