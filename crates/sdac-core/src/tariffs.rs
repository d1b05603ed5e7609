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

//! Downstream tariffs derived from the SDAC price

use serde::{Deserialize, Serialize};

fn default_factor() -> f64 {
    1.0
}

/// User-supplied terms of the custom price and injection formulas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    /// Factor applied to SDAC for the consumption price
    #[serde(default = "default_factor")]
    pub price_factor: f64,

    /// Fixed term added to the consumption price
    #[serde(default)]
    pub fixed_price: f64,

    /// Factor applied to SDAC for the injection tariff
    #[serde(default = "default_factor")]
    pub injection_factor: f64,

    /// Fixed term subtracted from the injection tariff
    #[serde(default)]
    pub fixed_injection_price: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            price_factor: 1.0,
            fixed_price: 0.0,
            injection_factor: 1.0,
            fixed_injection_price: 0.0,
        }
    }
}

impl TariffConfig {
    pub fn is_finite(&self) -> bool {
        [
            self.price_factor,
            self.fixed_price,
            self.injection_factor,
            self.fixed_injection_price,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    pub fn custom_price(&self, sdac: f64) -> f64 {
        round2((self.price_factor * sdac + self.fixed_price) * 1e3)
    }

    pub fn custom_injection(&self, sdac: f64) -> f64 {
        round2((self.injection_factor * sdac - self.fixed_injection_price) * 1e3)
    }
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ecopower consumption price: `1.02 * sdac + 4`
pub fn ecopower_price(sdac: f64) -> f64 {
    round2(1.02 * sdac + 4.0)
}

/// Ecopower injection tariff: `0.98 * sdac - 15`
pub fn ecopower_injection(sdac: f64) -> f64 {
    round2(0.98 * sdac - 15.0)
}

/// All tariffs derived from one SDAC reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPrices {
    pub ecopower_price: f64,
    pub ecopower_injection: f64,
    pub custom_price: f64,
    pub custom_injection: f64,
}

impl DerivedPrices {
    pub fn compute(sdac: f64, tariffs: &TariffConfig) -> Self {
        Self {
            ecopower_price: ecopower_price(sdac),
            ecopower_injection: ecopower_injection(sdac),
            custom_price: tariffs.custom_price(sdac),
            custom_injection: tariffs.custom_injection(sdac),
        }
    }
}
