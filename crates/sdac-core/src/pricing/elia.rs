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

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::PricePoint;
use crate::error::{Result, SdacError};

/// Daily quarter-hour SDAC auction results
pub const ELIA_BASE_URL: &str =
    "https://griddata.elia.be/eliabecontrols.prod/interface/Interconnections/daily/auctionresultsqh";

const USER_AGENT: &str = concat!("sdac-elia/", env!("CARGO_PKG_VERSION"));

/// Source of one market day's price table
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// All quarter-hour prices published for `date`
    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<PricePoint>>;
}

/// Raw entry of the Elia payload. Other fields are ignored.
///
/// `price` is null for blocks the auction has not cleared yet.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuctionResult {
    date_time: DateTime<Utc>,
    price: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct EliaClient {
    base_url: String,
    client: Client,
}

impl EliaClient {
    /// Create a client for `base_url`, with `timeout` applied to every request
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SdacError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// Daily document URL, e.g. `{base}/2025-10-02`
    pub fn url_for(&self, date: NaiveDate) -> String {
        format!("{}/{}", self.base_url, date.format("%Y-%m-%d"))
    }

    fn parse_payload(body: &str) -> Result<Vec<PricePoint>> {
        let results: Vec<AuctionResult> = serde_json::from_str(body)?;
        Ok(results
            .into_iter()
            .filter_map(|r| match r.price {
                Some(price) => Some(PricePoint {
                    time: r.date_time,
                    price,
                }),
                None => {
                    warn!("Skipping Elia block {} without a price", r.date_time);
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl PriceSource for EliaClient {
    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<PricePoint>> {
        let url = self.url_for(date);
        info!("Fetching SDAC prices from Elia: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Elia returned {} for {}", status, date);
            return Err(SdacError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let prices = Self::parse_payload(&body)?;

        if prices.is_empty() {
            warn!("Elia returned an empty price table for {}", date);
        } else {
            debug!(
                "Parsed {} price blocks for {} ({} .. {})",
                prices.len(),
                date,
                prices[0].time,
                prices[prices.len() - 1].time
            );
        }

        Ok(prices)
    }
}
