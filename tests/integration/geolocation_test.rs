// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zondcc::infrastructure::geolocation::GeoLocationService;

#[tokio::test]
async fn test_lookup_without_asn_skips_asn_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("ip", "192.0.2.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "city": "Oslo",
            "country": "Norway",
            "asn": 0,
        })))
        .expect(1)
        .mount(&server)
        .await;
    let service = GeoLocationService::new(server.uri(), Duration::from_secs(5));

    let channels = service.channels_for_ip("192.0.2.1").await;

    assert_eq!(channels, vec!["City:Oslo", "Country:Norway", "tasks"]);
}

#[tokio::test]
async fn test_failed_lookup_yields_only_tasks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let service = GeoLocationService::new(server.uri(), Duration::from_secs(5));

    assert!(service.get_location("192.0.2.1").await.is_err());
    assert_eq!(service.channels_for_ip("192.0.2.1").await, vec!["tasks"]);
}

#[tokio::test]
async fn test_slow_lookup_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "city": "Late" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let service = GeoLocationService::new(server.uri(), Duration::from_millis(200));

    assert_eq!(service.channels_for_ip("192.0.2.1").await, vec!["tasks"]);
}
