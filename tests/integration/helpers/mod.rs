// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use zondcc::config::settings::Settings;
use zondcc::domain::services::destination_resolver::DestinationResolver;
use zondcc::domain::services::dispatch_service::DispatchService;
use zondcc::domain::services::presence_service::PresenceService;
use zondcc::domain::services::task_service::TaskService;
use zondcc::infrastructure::cache::memory_store::InMemoryKvStore;
use zondcc::infrastructure::geolocation::GeoLocationService;
use zondcc::infrastructure::services::recording_notification_service::RecordingNotificationService;
use zondcc::presentation::routes::{self, AppServices};

/// 不可达的地理查询地址，查询总是失败
pub const UNREACHABLE_GEO: &str = "http://127.0.0.1:9";

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryKvStore>,
    pub notifier: Arc<RecordingNotificationService>,
    pub dispatch: DispatchService,
    pub presence: PresenceService,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_geo(UNREACHABLE_GEO).await
}

pub async fn create_test_app_with_geo(geo_url: &str) -> TestApp {
    create_test_app_with_settings(test_settings(geo_url, None)).await
}

pub fn test_settings(geo_url: &str, fqdn: Option<&str>) -> Settings {
    let mut builder = Settings::builder()
        .and_then(|b| b.set_override("redis.url", "memory://"))
        .and_then(|b| b.set_override("geo.url", geo_url))
        .and_then(|b| b.set_override("metrics.enabled", false))
        .expect("Failed to build test settings");
    if let Some(fqdn) = fqdn {
        builder = builder
            .set_override("server.fqdn", fqdn)
            .expect("Failed to set fqdn");
    }
    builder
        .build()
        .and_then(|c| c.try_deserialize())
        .expect("Failed to load test settings")
}

pub async fn create_test_app_with_settings(settings: Settings) -> TestApp {
    let settings = Arc::new(settings);
    let store = Arc::new(InMemoryKvStore::new());
    let notifier = Arc::new(RecordingNotificationService::new());

    let resolver = DestinationResolver::new(store.clone(), notifier.clone());
    let tasks = TaskService::new(
        store.clone(),
        notifier.clone(),
        resolver.clone(),
        settings.dispatch.clone(),
    );
    let dispatch = DispatchService::new(store.clone(), notifier.clone(), settings.dispatch.clone());
    let presence = PresenceService::new(
        store.clone(),
        notifier.clone(),
        resolver,
        settings.dispatch.clone(),
    );
    let geo = Arc::new(GeoLocationService::new(
        settings.geo.url.clone(),
        Duration::from_secs(1),
    ));

    let app = routes::routes(AppServices {
        settings,
        tasks,
        dispatch: dispatch.clone(),
        presence: presence.clone(),
        geo,
    });

    TestApp {
        server: TestServer::new(app).expect("Failed to start test server"),
        store,
        notifier,
        dispatch,
        presence,
    }
}

impl TestApp {
    /// 注册执行者并返回其ID，`path` 为 `zond` 或 `mngr`
    pub async fn register(&self, path: &str, user: &str) -> String {
        let response = self
            .server
            .post(&format!("/{}/create", path))
            .add_header("X-Forwarded-User", user.to_string())
            .form(&json!({ "name": "" }))
            .await;
        let body: Value = response.json();
        body["uuid"].as_str().expect("missing uuid").to_string()
    }

    /// 注册并上线探针
    pub async fn online_probe(&self, user: &str, channels: &[&str]) -> String {
        let id = self.register("zond", user).await;
        let mut request = self
            .server
            .post("/zond/sub")
            .add_header("X-ZondUuid", id.clone());
        for (i, channel) in channels.iter().enumerate() {
            request = request.add_header(format!("X-Channel-Id{}", i), channel.to_string());
        }
        request.await.assert_status_ok();
        id
    }

    /// 创建任务并返回表单的响应体
    pub async fn create_task(&self, user: &str, form: Value) -> (u16, Value) {
        let response = self
            .server
            .post("/task/create")
            .add_header("X-Forwarded-User", user.to_string())
            .form(&form)
            .await;
        (response.status_code().as_u16(), response.json())
    }

    /// 最近一次发布到某主题的消息
    pub fn last_published(&self, topic: &str) -> Option<Value> {
        self.notifier
            .published_to(topic)
            .last()
            .map(|raw| serde_json::from_str(raw).expect("published payload is not json"))
    }

    /// 以执行者身份发送协议消息
    pub async fn worker_call(&self, path: &str, header: &str, worker_id: &str, body: Value) -> Value {
        self.server
            .post(path)
            .add_header(header.to_string(), worker_id.to_string())
            .text(body.to_string())
            .await
            .json()
    }
}
