// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app;
use axum::http::StatusCode;
use serde_json::{json, Value};
use zondcc::domain::models::worker::WorkerRole;
use zondcc::domain::repositories::kv_store::KvStore;

fn ok() -> Value {
    json!({ "status": "ok", "message": "ok" })
}

fn error(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

#[tokio::test]
async fn test_probe_claims_and_completes_task() {
    // Given
    let app = create_test_app().await;
    let probe = app.online_probe("alice", &["City:Berlin"]).await;
    let other = app.online_probe("alice", &[]).await;
    app.create_task("alice", json!({ "ip": "8.8.8.8", "type": "ping" }))
        .await;
    let task_id = app.last_published("tasks").unwrap()["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    // When: 两个探针争抢同一个任务
    let first = app
        .worker_call("/zond/task/block", "X-ZondUuid", &probe, json!({ "action": "block", "uuid": task_id }))
        .await;
    let second = app
        .worker_call("/zond/task/block", "X-ZondUuid", &other, json!({ "action": "block", "uuid": task_id }))
        .await;

    // Then
    assert_eq!(first, ok());
    assert_eq!(second, error("task not found"));

    // When: 同一探针再领取另一个任务
    app.create_task("alice", json!({ "ip": "1.1.1.1", "type": "ping" }))
        .await;
    let next_id = app.last_published("tasks").unwrap()["uuid"].clone();
    let busy = app
        .worker_call("/zond/task/block", "X-ZondUuid", &probe, json!({ "action": "block", "uuid": next_id }))
        .await;

    // Then
    assert_eq!(busy, error("only one task at time is allowed"));

    // When: 上报结果
    let result = app
        .worker_call(
            "/zond/task/result",
            "X-ZondUuid",
            &probe,
            json!({ "action": "result", "uuid": task_id, "result": "rtt=12ms" }),
        )
        .await;

    // Then
    assert_eq!(result, ok());
    let done = app.last_published("tasks/done").unwrap();
    assert_eq!(done["uuid"], task_id.as_str());
    assert_eq!(done["result"], "rtt=12ms");
    assert_eq!(done["zond"], probe.as_str());
    assert_eq!(done["param"], "8.8.8.8");

    // When: 重复上报
    let again = app
        .worker_call(
            "/zond/task/result",
            "X-ZondUuid",
            &probe,
            json!({ "action": "result", "uuid": task_id, "result": "late" }),
        )
        .await;

    // Then
    assert_eq!(again, error("task not found"));
    assert_eq!(app.notifier.published_to("tasks/done").len(), 1);
}

#[tokio::test]
async fn test_manager_is_not_limited_to_one_task() {
    // Given
    let app = create_test_app().await;
    let manager = app.register("mngr", "alice").await;
    for ip in ["1.1.1.1", "8.8.8.8"] {
        app.create_task(
            "alice",
            json!({ "ip": ip, "type": "ping", "maintype": "measurement" }),
        )
        .await;
    }
    let ids: Vec<Value> = app
        .notifier
        .published_to("mngrtasks")
        .iter()
        .map(|raw| serde_json::from_str::<Value>(raw).unwrap()["uuid"].clone())
        .collect();

    // When
    for id in &ids {
        let reply = app
            .worker_call("/mngr/task/block", "X-MngrUuid", &manager, json!({ "action": "block", "uuid": id }))
            .await;
        assert_eq!(reply, ok());
    }
    let reply = app
        .worker_call(
            "/mngr/task/result",
            "X-MngrUuid",
            &manager,
            json!({ "action": "result", "uuid": ids[0], "result": "{}" }),
        )
        .await;

    // Then
    assert_eq!(reply, ok());
    let done = app.last_published("tasks/done").unwrap();
    assert_eq!(done["mngr"], manager.as_str());
    assert_eq!(done["zond"], "");
}

#[tokio::test]
async fn test_worker_endpoints_require_registered_identity() {
    let app = create_test_app().await;
    let body = json!({ "action": "block", "uuid": "x" }).to_string();

    let response = app.server.post("/zond/task/block").text(body.clone()).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.text(), "Not authorized");

    let response = app
        .server
        .post("/zond/task/block")
        .add_header("X-ZondUuid", "00000000-0000-0000-0000-000000000000")
        .text(body.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    // 探针ID不能用于管理器接口
    let probe = app.register("zond", "alice").await;
    let response = app
        .server
        .post("/mngr/task/block")
        .add_header("X-MngrUuid", probe)
        .text(body)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_subscribe_unregistered_is_forbidden() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/zond/sub")
        .add_header("X-ZondUuid", "00000000-0000-0000-0000-000000000000")
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["status"], "error");
}

#[tokio::test]
async fn test_heartbeat_round_trip_over_http() {
    // Given
    let app = create_test_app().await;
    let probe = app.online_probe("alice", &["Country:DE"]).await;
    let destinations = app.last_published("destinations").unwrap();
    assert_eq!(destinations["countries"], json!(["DE"]));

    // When: 挑战后应答
    app.presence.check_alive(WorkerRole::Probe).await.unwrap();
    let challenge = app.last_published(&format!("zond:{}", probe)).unwrap();
    assert_eq!(challenge["action"], "alive");
    let reply = app
        .worker_call("/zond/pong", "X-ZondUuid", &probe, json!({ "uuid": challenge["uuid"] }))
        .await;

    // Then
    assert_eq!(reply, json!({ "status": "ok" }));
    assert_eq!(app.presence.check_alive(WorkerRole::Probe).await.unwrap(), 0);

    // When: 不再应答
    let evicted = app.presence.check_alive(WorkerRole::Probe).await.unwrap();

    // Then
    assert_eq!(evicted, 1);
    assert_eq!(app.server.get("/").await.json::<Value>(), json!([]));
    assert!(!app.store.set_is_member("Zond-online", &probe).await.unwrap());
    assert_eq!(app.notifier.unpublished(), vec![format!("zond:{}", probe)]);
}

#[tokio::test]
async fn test_unsubscribe_and_my_workers() {
    // Given
    let app = create_test_app().await;
    let probe = app.online_probe("alice", &["ASN:3320"]).await;

    // When
    app.server
        .post("/zond/unsub")
        .add_header("X-ZondUuid", probe.clone())
        .await
        .assert_status_ok();

    // Then
    let destinations = app.last_published("destinations").unwrap();
    assert_eq!(destinations["zonds"], json!([]));
    assert_eq!(destinations["asns"], json!([]));

    let mine: Value = app
        .server
        .get("/zond/my")
        .add_header("X-Forwarded-User", "alice")
        .await
        .json();
    assert_eq!(mine["total"], 1);
    assert_eq!(mine["results"][0]["uuid"], probe.as_str());

    let theirs: Value = app
        .server
        .get("/mngr/my?page=7")
        .add_header("X-Forwarded-User", "alice")
        .await
        .json();
    assert_eq!(theirs["total"], 0);
    assert_eq!(theirs["page"], 1);
}
