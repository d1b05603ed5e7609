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

use crate::errors::{HaError, HaResult};
use crate::types::{HaEntityState, StateUpdate};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

const SUPERVISOR_URL: &str = "http://supervisor/core";
const DEFAULT_BASE_URL: &str = "http://localhost:8123";

/// Home Assistant REST API client
#[derive(Clone)]
pub struct HomeAssistantClient {
    base_url: String,
    token: String,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for HomeAssistantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

impl HomeAssistantClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> HaResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HaError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Create HA client from configuration values
    /// Falls back to environment variables, then to the Supervisor API
    pub fn from_config(ha_base_url: Option<String>, ha_token: Option<String>) -> HaResult<Self> {
        Self::from_config_with(ha_base_url, ha_token, |key| std::env::var(key).ok())
    }

    /// Same as [`HomeAssistantClient::from_config`], reading variables through `lookup`
    pub fn from_config_with(
        ha_base_url: Option<String>,
        ha_token: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> HaResult<Self> {
        if ha_base_url.is_none()
            && ha_token.is_none()
            && lookup("HA_TOKEN").is_none()
            && let Some(token) = lookup("SUPERVISOR_TOKEN")
        {
            info!("Initializing HA client using Supervisor API");
            return Self::new(SUPERVISOR_URL, token);
        }

        let base_url = ha_base_url
            .or_else(|| lookup("HA_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let token = ha_token.or_else(|| lookup("HA_TOKEN")).ok_or_else(|| {
            HaError::ConfigError(
                "HA token not found in config, HA_TOKEN or SUPERVISOR_TOKEN".to_owned(),
            )
        })?;

        info!("Initializing HA client from configuration: {}", base_url);
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the state of a specific entity
    pub async fn get_state(&self, entity_id: &str) -> HaResult<HaEntityState> {
        let url = format!("{}/api/states/{}", self.base_url, entity_id);
        debug!("🔍 [HA QUERY] Getting state for entity: {}", entity_id);

        let response = self
            .retry_request(|| async { self.client.get(&url).bearer_auth(&self.token).send().await })
            .await?;

        match response.status() {
            StatusCode::OK => {
                let state = response.json::<HaEntityState>().await?;
                debug!("✅ [HA RESULT] Entity: {} = '{}'", entity_id, state.state);
                trace!("   Attributes: {:?}", state.attributes);
                Ok(state)
            }
            StatusCode::NOT_FOUND => {
                error!("❌ [HA ERROR] Entity not found: {}", entity_id);
                Err(HaError::EntityNotFound(entity_id.to_owned()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("❌ [HA ERROR] Authentication failed for entity: {}", entity_id);
                Err(HaError::AuthenticationFailed)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [HA ERROR] Status {}: {}", status, error_text);
                Err(HaError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Create or update the state of an entity
    ///
    /// HA answers 201 when the entity is created and 200 when it is updated.
    pub async fn set_state(
        &self,
        entity_id: &str,
        state: &str,
        attributes: &Map<String, Value>,
    ) -> HaResult<()> {
        let url = format!("{}/api/states/{}", self.base_url, entity_id);
        let body = StateUpdate { state, attributes };
        debug!("📤 [HA STATE] {} = '{}'", entity_id, state);

        let response = self
            .retry_request(|| async {
                self.client
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&body)
                    .send()
                    .await
            })
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                trace!("✅ [HA STATE] Accepted: {}", entity_id);
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("❌ [HA STATE] Authentication failed for: {}", entity_id);
                Err(HaError::AuthenticationFailed)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [HA STATE] Status {} for {}: {}", status, entity_id, error_text);
                Err(HaError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Health check - ping HA API
    pub async fn ping(&self) -> HaResult<bool> {
        let url = format!("{}/api/", self.base_url);
        debug!("Performing health check");

        match self.client.get(&url).bearer_auth(&self.token).send().await {
            Ok(response) => {
                let is_ok = response.status().is_success();
                if is_ok {
                    debug!("Health check passed");
                } else {
                    warn!("Health check failed: status {}", response.status());
                }
                Ok(is_ok)
            }
            Err(e) => {
                warn!("Health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut>(&self, mut request_fn: F) -> HaResult<reqwest::Response>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            match request_fn().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("Request failed after {} attempts: {}", attempts, e);
                    return Err(HaError::HttpError(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    /// Set custom retry configuration
    #[must_use]
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }
}
