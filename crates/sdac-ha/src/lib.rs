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

pub mod client;
pub mod errors;
pub mod publisher;
pub mod sensors;
pub mod types;

pub use client::HomeAssistantClient;
pub use errors::{HaError, HaResult};
pub use publisher::SensorPublisher;
pub use sensors::{SensorKind, SensorState};
pub use types::HaEntityState;
