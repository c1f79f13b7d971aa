// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_test_app, create_test_app_with_geo, create_test_app_with_settings, test_settings,
    UNREACHABLE_GEO,
};
use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_anonymous_viewer_subscribes_to_public_topics() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/dispatch/")
        .add_header("X-Forwarded-For", "10.0.0.1")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("X-Accel-Redirect"),
        "/internal/sub/destinations,tasks/done,10.0.0.1"
    );
    assert_eq!(response.header("X-Accel-Buffering"), "no");
}

#[tokio::test]
async fn test_anonymous_redirect_appends_configured_fqdn() {
    let app = create_test_app_with_settings(test_settings(UNREACHABLE_GEO, Some("cc.example.org"))).await;

    let response = app
        .server
        .get("/dispatch/")
        .add_header("X-Forwarded-For", "10.0.0.1")
        .await;

    assert_eq!(
        response.header("X-Accel-Redirect"),
        "/internal/sub/destinations,tasks/done,10.0.0.1,cc.example.org"
    );
}

#[tokio::test]
async fn test_unknown_worker_is_redirected_to_404() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/dispatch/")
        .add_header("X-ZondUuid", "00000000-0000-0000-0000-000000000000")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.header("X-Accel-Redirect"), "/404");
    assert_eq!(response.header("X-Accel-Buffering"), "no");
}

#[tokio::test]
async fn test_manager_subscribes_to_manager_topics() {
    let app = create_test_app().await;
    let manager = app.register("mngr", "alice").await;

    let response = app
        .server
        .get("/dispatch/")
        .add_header("X-MngrUuid", manager.clone())
        .add_header("X-Forwarded-For", "10.0.0.2")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("X-Accel-Redirect"),
        format!("/internal/sub/mngrtasks,mngr{},10.0.0.2", manager).as_str()
    );
}

#[tokio::test]
async fn test_probe_subscribes_to_geo_channels() {
    // Given
    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("ip", "10.0.0.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "city": "Berlin",
            "country": "Germany",
            "country_code": "DE",
            "asn": 3320,
            "provider": "DTAG",
            "lat": 52.5,
            "lon": 13.4,
        })))
        .mount(&geo)
        .await;
    let app = create_test_app_with_geo(&geo.uri()).await;
    let probe = app.register("zond", "alice").await;

    // When
    let response = app
        .server
        .get("/dispatch/")
        .add_header("X-ZondUuid", probe.clone())
        .add_header("X-Forwarded-For", "10.0.0.3")
        .await;

    // Then
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("X-Accel-Redirect"),
        format!(
            "/internal/sub/zond:{},City:Berlin,Country:Germany,ASN:3320,tasks,10.0.0.3",
            probe
        )
        .as_str()
    );
}

#[tokio::test]
async fn test_probe_redirect_without_geo_lookup() {
    let app = create_test_app().await;
    let probe = app.register("zond", "alice").await;

    let response = app
        .server
        .get("/dispatch/")
        .add_header("X-ZondUuid", probe.clone())
        .add_header("X-Forwarded-For", "10.0.0.4")
        .await;

    assert_eq!(
        response.header("X-Accel-Redirect"),
        format!("/internal/sub/zond:{},tasks,10.0.0.4", probe).as_str()
    );
}
