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

pub mod elia;

pub use elia::{EliaClient, PriceSource};

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Length of one market time block
pub const QUARTER_HOUR_MINUTES: u32 = 15;

/// Format used by Elia for `dateTime` values
pub const SLOT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A single quarter-hour auction result (EUR/MWh)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Start of the quarter-hour block, in UTC
    pub time: DateTime<Utc>,
    pub price: f64,
}

/// Floor a UTC instant to the start of its 15-minute block
pub fn quarter_hour_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let minute = now.minute() - now.minute() % QUARTER_HOUR_MINUTES;
    now.date_naive()
        .and_hms_opt(now.hour(), minute, 0)
        .map_or(now, |slot| slot.and_utc())
}

/// Render a block start the way Elia writes `dateTime`
pub fn slot_key(slot: DateTime<Utc>) -> String {
    slot.format(SLOT_FORMAT).to_string()
}

/// Look up the price of the block starting exactly at `slot`
pub fn find_price(prices: &[PricePoint], slot: DateTime<Utc>) -> Option<f64> {
    prices
        .iter()
        .find(|point| point.time == slot)
        .map(|point| point.price)
}

/// Price of the block containing `now`, or `None` if the table has no such block
pub fn current_price(prices: &[PricePoint], now: DateTime<Utc>) -> Option<f64> {
    let slot = quarter_hour_start(now);
    match find_price(prices, slot) {
        Some(price) => {
            debug!("Matched slot {} at {:.2} EUR/MWh", slot_key(slot), price);
            Some(price)
        }
        None => {
            error!(
                "No time match for {} in {} Elia prices",
                slot_key(slot),
                prices.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, h, m, s).unwrap()
    }

    fn day_table() -> Vec<PricePoint> {
        (0..96)
            .map(|i| PricePoint {
                time: utc(0, 0, 0) + chrono::Duration::minutes(15 * i),
                price: f64::from(u32::try_from(i).unwrap()) * 1.5,
            })
            .collect()
    }

    #[test]
    fn test_quarter_hour_floor() {
        assert_eq!(quarter_hour_start(utc(13, 7, 0)), utc(13, 0, 0));
        assert_eq!(quarter_hour_start(utc(13, 15, 0)), utc(13, 15, 0));
        assert_eq!(quarter_hour_start(utc(13, 59, 0)), utc(13, 45, 0));
        assert_eq!(quarter_hour_start(utc(0, 0, 0)), utc(0, 0, 0));
        assert_eq!(quarter_hour_start(utc(23, 44, 59)), utc(23, 30, 0));
    }

    #[test]
    fn test_quarter_hour_floor_drops_subseconds() {
        let now = utc(8, 31, 12) + chrono::Duration::milliseconds(987);
        let slot = quarter_hour_start(now);
        assert_eq!(slot, utc(8, 30, 0));
        assert_eq!(slot.nanosecond(), 0);
    }

    #[test]
    fn test_slot_key_matches_elia_format() {
        assert_eq!(slot_key(utc(22, 45, 0)), "2025-10-01T22:45:00Z");
    }

    #[test]
    fn test_current_price_matches_block() {
        let prices = day_table();
        // 13:07 falls in block 52 (13:00)
        assert_eq!(current_price(&prices, utc(13, 7, 30)), Some(78.0));
        assert_eq!(current_price(&prices, utc(13, 59, 59)), Some(82.5));
    }

    #[test]
    fn test_missing_slot_is_none() {
        let prices = day_table();
        let next_day = Utc.with_ymd_and_hms(2025, 10, 2, 9, 20, 0).unwrap();
        assert_eq!(current_price(&prices, next_day), None);
        assert_eq!(current_price(&[], utc(9, 20, 0)), None);
    }

    #[test]
    fn test_price_point_serializes_for_attributes() {
        let point = PricePoint {
            time: utc(22, 0, 0),
            price: 87.13,
        };
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json["time"], "2025-10-01T22:00:00Z");
        assert_eq!(json["price"], 87.13);
    }
}
