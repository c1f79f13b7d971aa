// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");

    let response = app.server.get("/version").await;
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_task_publishes_to_tasks() {
    // Given
    let app = create_test_app().await;

    // When
    let (status, body) = app
        .create_task("alice", json!({ "ip": "8.8.8.8", "type": "ping" }))
        .await;

    // Then
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "status": "ok" }));
    let task = app.last_published("tasks").expect("task was not published");
    assert_eq!(task["action"], "ping");
    assert_eq!(task["param"], "8.8.8.8");
    assert_eq!(task["parent"], task["uuid"]);
    assert_eq!(task["repeat"], "single");

    let listing: Value = app
        .server
        .get("/task/my")
        .add_header("X-Forwarded-User", "alice")
        .await
        .json();
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["page"], 1);
    assert_eq!(listing["results"][0]["uuid"], task["uuid"]);

    let other: Value = app
        .server
        .get("/task/my")
        .add_header("X-Forwarded-User", "bob")
        .await
        .json();
    assert_eq!(other["total"], 0);
}

#[tokio::test]
async fn test_validation_boundary() {
    let app = create_test_app().await;

    let cases = [
        (json!({ "ip": "", "type": "ping" }), "Missing required IP param"),
        (json!({ "ip": "8.8.8.8", "type": "banana" }), "wrong task type"),
        (json!({ "ip": "ftp://x.com", "type": "head" }), "must start with http(s)://"),
        (json!({ "ip": "8.8.8.8-not_a_host!!", "type": "dns" }), "wrong resolver"),
        (json!({ "ip": "not a host", "type": "ping" }), "wrong ip/hostname"),
    ];

    for (form, reason) in cases {
        let (status, body) = app.create_task("alice", form).await;
        assert_eq!(status, 400, "{}", reason);
        assert_eq!(body, json!({ "status": "error", "error": reason }));
    }

    // 校验失败没有任何副作用
    assert!(app.notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_head_param_is_normalized() {
    let app = create_test_app().await;

    let (status, _) = app
        .create_task(
            "alice",
            json!({ "ip": "https://example.com/some/path?q=1", "type": "head" }),
        )
        .await;

    assert_eq!(status, 200);
    let task = app.last_published("tasks").unwrap();
    assert_eq!(task["param"], "https://example.com");
}

#[tokio::test]
async fn test_destination_hint_targets_online_probe() {
    // Given
    let app = create_test_app().await;
    let probe = app.online_probe("alice", &[]).await;

    // When
    app.create_task(
        "alice",
        json!({ "ip": "1.1.1.1", "type": "ping", "dest": format!("zond:uuid:{}", probe) }),
    )
    .await;
    app.create_task(
        "alice",
        json!({ "ip": "1.1.1.1", "type": "ping", "dest": "zond:uuid:offline-probe" }),
    )
    .await;

    // Then
    let direct = app.last_published(&format!("zond:{}", probe)).unwrap();
    assert_eq!(direct["target"], format!("zond:{}", probe));
    let fallback = app.last_published("tasks").unwrap();
    assert_eq!(fallback["target"], "tasks");
}

#[tokio::test]
async fn test_measurement_goes_to_manager_topic() {
    let app = create_test_app().await;

    app.create_task(
        "alice",
        json!({ "ip": "1.1.1.1", "type": "traceroute", "maintype": "measurement", "taskcount": "3" }),
    )
    .await;

    let task = app.last_published("mngrtasks").unwrap();
    assert_eq!(task["type"], "measurement");
    assert_eq!(task["count"], 3);
    assert!(app.last_published("tasks").is_none());
}

#[tokio::test]
async fn test_repeatable_listing_and_removal() {
    // Given
    let app = create_test_app().await;
    app.create_task(
        "alice",
        json!({ "ip": "example.com", "type": "ping", "repeat": "5min" }),
    )
    .await;
    let task = app.last_published("tasks").unwrap();

    let listing: Value = app.server.get("/task/repeatable").await.json();
    assert_eq!(listing.as_array().unwrap().len(), 1);
    assert_eq!(listing[0]["uuid"], task["uuid"]);

    // When: 非法ID
    let response = app
        .server
        .post("/task/repeatable/remove")
        .form(&json!({ "uuid": "short" }))
        .await;

    // Then
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "status": "error", "error": "Missing required UUID param." })
    );

    // When
    let response = app
        .server
        .post("/task/repeatable/remove")
        .form(&json!({ "uuid": task["uuid"] }))
        .await;

    // Then
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
    let listing: Value = app.server.get("/task/repeatable").await.json();
    assert!(listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_root_lists_online_probes() {
    let app = create_test_app().await;
    assert_eq!(app.server.get("/").await.json::<Value>(), json!([]));

    let probe = app.online_probe("alice", &[]).await;

    assert_eq!(app.server.get("/").await.json::<Value>(), json!([probe]));
}
