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

//! Shared price coordinator
//!
//! Fetches the Elia table at most once per market day and derives the
//! current readings on every refresh. Sensors read the resulting snapshot
//! and never fetch themselves.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::pricing::{PricePoint, PriceSource, current_price, quarter_hour_start};
use crate::tariffs::{DerivedPrices, TariffConfig};

/// Readings produced by one refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    /// Start of the quarter-hour the readings apply to
    pub slot_start: DateTime<Utc>,
    pub sdac_price: Option<f64>,
    pub derived: Option<DerivedPrices>,
    /// Full table of the cached market day
    pub prices: Vec<PricePoint>,
    pub market_date: Option<NaiveDate>,
    pub last_fetch_time: Option<DateTime<Utc>>,
}

impl PriceSnapshot {
    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            slot_start: quarter_hour_start(now),
            sdac_price: None,
            derived: None,
            prices: Vec::new(),
            market_date: None,
            last_fetch_time: None,
        }
    }
}

#[derive(Debug, Default)]
struct PriceCache {
    prices: Vec<PricePoint>,
    fetched_for: Option<NaiveDate>,
    fetched_at: Option<DateTime<Utc>>,
}

pub struct PriceCoordinator {
    source: Arc<dyn PriceSource>,
    tariffs: TariffConfig,
    market_tz: Tz,
    // Held across the fetch so overlapping refreshes cannot fetch twice
    cache: Mutex<PriceCache>,
    latest: RwLock<Option<PriceSnapshot>>,
}

impl PriceCoordinator {
    /// Coordinator over `source`, with the market day taken in `market_tz`
    pub fn new(source: Arc<dyn PriceSource>, tariffs: TariffConfig, market_tz: Tz) -> Self {
        info!(
            "SDAC price coordinator set up (market timezone: {})",
            market_tz.name()
        );
        Self {
            source,
            tariffs,
            market_tz,
            cache: Mutex::new(PriceCache::default()),
            latest: RwLock::new(None),
        }
    }

    /// Calendar date in the market timezone, which selects the Elia document
    pub fn market_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.market_tz).date_naive()
    }

    /// Most recent snapshot, without fetching
    pub fn snapshot(&self) -> Option<PriceSnapshot> {
        self.latest.read().clone()
    }

    /// [`PriceCoordinator::refresh_at`] for the current time
    pub async fn refresh(&self) -> PriceSnapshot {
        self.refresh_at(Utc::now()).await
    }

    /// Fetch the market day's table if not cached yet and derive the readings for `now`
    ///
    /// A failed fetch leaves the cache untouched and returns the previous
    /// snapshot, so the next call retries.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> PriceSnapshot {
        let today = self.market_date(now);
        let mut cache = self.cache.lock().await;

        if cache.fetched_for != Some(today) {
            match self.source.fetch_day(today).await {
                Ok(prices) => {
                    info!(
                        "SDAC prices fetched from Elia for {} ({} blocks)",
                        today,
                        prices.len()
                    );
                    cache.prices = prices;
                    cache.fetched_for = Some(today);
                    cache.fetched_at = Some(now);
                }
                Err(e) => {
                    error!("Error fetching data from Elia: {}", e);
                    return self
                        .snapshot()
                        .unwrap_or_else(|| PriceSnapshot::empty(now));
                }
            }
        }

        let sdac_price = current_price(&cache.prices, now);
        let snapshot = PriceSnapshot {
            slot_start: quarter_hour_start(now),
            sdac_price,
            derived: sdac_price.map(|sdac| DerivedPrices::compute(sdac, &self.tariffs)),
            prices: cache.prices.clone(),
            market_date: cache.fetched_for,
            last_fetch_time: cache.fetched_at,
        };
        drop(cache);

        *self.latest.write() = Some(snapshot.clone());
        snapshot
    }
}

impl std::fmt::Debug for PriceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceCoordinator")
            .field("tariffs", &self.tariffs)
            .field("market_tz", &self.market_tz)
            .field("latest", &self.latest.read())
            .finish_non_exhaustive()
    }
}
