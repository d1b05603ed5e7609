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

//! SDAC Elia core - day-ahead price fetching, quarter-hour matching and tariffs
//!
//! The coordinator is the only component that talks to Elia. Everything
//! downstream (sensors, CLI output) reads the [`PriceSnapshot`] it produces.

pub mod coordinator;
pub mod error;
pub mod pricing;
pub mod tariffs;

pub use coordinator::{PriceCoordinator, PriceSnapshot};
pub use error::{Result, SdacError};
pub use pricing::elia::{ELIA_BASE_URL, EliaClient, PriceSource};
pub use pricing::{PricePoint, current_price, find_price, quarter_hour_start, slot_key};
pub use tariffs::{DerivedPrices, TariffConfig};
