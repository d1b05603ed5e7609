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

//! End-to-end: Elia payload -> coordinator -> Home Assistant states

use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server};
use sdac_core::{EliaClient, PriceCoordinator, TariffConfig};
use sdac_ha::{HaError, HomeAssistantClient, SensorKind, SensorPublisher};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn elia_body() -> String {
    json!([
        {"dateTime": "2025-10-02T12:45:00Z", "price": 48.0},
        {"dateTime": "2025-10-02T13:00:00Z", "price": 50.0},
        {"dateTime": "2025-10-02T13:15:00Z", "price": 52.0}
    ])
    .to_string()
}

async fn coordinator_with(elia: &Server) -> PriceCoordinator {
    let client = EliaClient::new(elia.url(), Duration::from_secs(5)).unwrap();
    PriceCoordinator::new(
        Arc::new(client),
        TariffConfig {
            price_factor: 1.1,
            fixed_price: 0.02,
            injection_factor: 1.0,
            fixed_injection_price: 0.0,
        },
        chrono_tz::Europe::Brussels,
    )
}

#[tokio::test]
async fn test_snapshot_published_to_all_sensors() {
    let mut elia = Server::new_async().await;
    let elia_mock = elia
        .mock("GET", "/2025-10-02")
        .with_status(200)
        .with_body(elia_body())
        .create_async()
        .await;

    let mut ha = Server::new_async().await;
    let main_mock = ha
        .mock("POST", "/api/states/sensor.sdac_elia_sdac_price")
        .match_header("authorization", "Bearer token")
        .match_body(Matcher::PartialJson(json!({
            "state": "50.00",
            "attributes": {
                "friendly_name": "Elia SDAC price",
                "prices": [
                    {"time": "2025-10-02T12:45:00Z", "price": 48.0},
                    {"time": "2025-10-02T13:00:00Z", "price": 50.0},
                    {"time": "2025-10-02T13:15:00Z", "price": 52.0}
                ]
            }
        })))
        .with_status(201)
        .create_async()
        .await;
    let ecopower_mock = ha
        .mock("POST", "/api/states/sensor.sdac_elia_ecopower_price")
        .match_body(Matcher::PartialJson(json!({"state": "55.00"})))
        .with_status(200)
        .create_async()
        .await;
    let injection_mock = ha
        .mock("POST", "/api/states/sensor.sdac_elia_ecopower_injection_tariff")
        .match_body(Matcher::PartialJson(json!({"state": "34.00"})))
        .with_status(200)
        .create_async()
        .await;
    let custom_mock = ha
        .mock("POST", "/api/states/sensor.sdac_elia_custom_price")
        .match_body(Matcher::PartialJson(json!({"state": "55020.00"})))
        .with_status(200)
        .create_async()
        .await;
    let custom_injection_mock = ha
        .mock("POST", "/api/states/sensor.sdac_elia_custom_injection_tariff")
        .match_body(Matcher::PartialJson(json!({"state": "50000.00"})))
        .with_status(200)
        .create_async()
        .await;

    let coordinator = coordinator_with(&elia).await;
    let snapshot = coordinator
        .refresh_at(Utc.with_ymd_and_hms(2025, 10, 2, 13, 7, 0).unwrap())
        .await;

    let client = Arc::new(HomeAssistantClient::new(ha.url(), "token").unwrap());
    let publisher = SensorPublisher::new(client, "sdac_elia");
    let published = publisher.publish(&snapshot).await.unwrap();

    assert_eq!(published, SensorKind::ALL.len());
    elia_mock.assert_async().await;
    main_mock.assert_async().await;
    ecopower_mock.assert_async().await;
    injection_mock.assert_async().await;
    custom_mock.assert_async().await;
    custom_injection_mock.assert_async().await;
}

#[tokio::test]
async fn test_unmatched_slot_published_as_unknown() {
    let mut elia = Server::new_async().await;
    let _elia_mock = elia
        .mock("GET", "/2025-10-02")
        .with_status(200)
        .with_body(elia_body())
        .create_async()
        .await;

    let mut ha = Server::new_async().await;
    let unknown_mock = ha
        .mock("POST", Matcher::Regex(r"^/api/states/sensor\.sdac_elia_.*$".to_owned()))
        .match_body(Matcher::PartialJson(json!({"state": "unknown"})))
        .with_status(200)
        .expect(5)
        .create_async()
        .await;

    let coordinator = coordinator_with(&elia).await;
    let snapshot = coordinator
        .refresh_at(Utc.with_ymd_and_hms(2025, 10, 2, 18, 0, 0).unwrap())
        .await;
    assert_eq!(snapshot.sdac_price, None);

    let client = Arc::new(HomeAssistantClient::new(ha.url(), "token").unwrap());
    let publisher = SensorPublisher::new(client, "sdac_elia");

    assert_eq!(publisher.publish(&snapshot).await.unwrap(), 5);
    unknown_mock.assert_async().await;
}

#[tokio::test]
async fn test_partial_failure_still_publishes_rest() {
    let mut elia = Server::new_async().await;
    let _elia_mock = elia
        .mock("GET", "/2025-10-02")
        .with_status(200)
        .with_body(elia_body())
        .create_async()
        .await;

    let mut ha = Server::new_async().await;
    let _rejected = ha
        .mock("POST", "/api/states/sensor.sdac_elia_custom_price")
        .with_status(400)
        .create_async()
        .await;
    let _accepted = ha
        .mock(
            "POST",
            Matcher::Regex(
                r"^/api/states/sensor\.sdac_elia_(sdac_price|ecopower_price|ecopower_injection_tariff|custom_injection_tariff)$"
                    .to_owned(),
            ),
        )
        .with_status(200)
        .create_async()
        .await;

    let coordinator = coordinator_with(&elia).await;
    let snapshot = coordinator
        .refresh_at(Utc.with_ymd_and_hms(2025, 10, 2, 13, 20, 0).unwrap())
        .await;

    let client = Arc::new(HomeAssistantClient::new(ha.url(), "token").unwrap());
    let publisher = SensorPublisher::new(client, "sdac_elia");

    assert_eq!(publisher.publish(&snapshot).await.unwrap(), 4);
}

#[tokio::test]
async fn test_all_rejected_is_error() {
    let mut elia = Server::new_async().await;
    let _elia_mock = elia
        .mock("GET", "/2025-10-02")
        .with_status(200)
        .with_body(elia_body())
        .create_async()
        .await;

    let mut ha = Server::new_async().await;
    let _rejected = ha
        .mock("POST", Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let coordinator = coordinator_with(&elia).await;
    let snapshot = coordinator
        .refresh_at(Utc.with_ymd_and_hms(2025, 10, 2, 13, 20, 0).unwrap())
        .await;

    let client = Arc::new(HomeAssistantClient::new(ha.url(), "bad").unwrap());
    let publisher = SensorPublisher::new(client, "sdac_elia");

    assert!(matches!(
        publisher.publish(&snapshot).await,
        Err(HaError::PublishFailed(5))
    ));
}
