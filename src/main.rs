// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use zondcc::config::settings::Settings;
use zondcc::domain::models::worker::WorkerRole;
use zondcc::domain::repositories::kv_store::KvStore;
use zondcc::domain::services::destination_resolver::DestinationResolver;
use zondcc::domain::services::dispatch_service::DispatchService;
use zondcc::domain::services::notification_service::NotificationService;
use zondcc::domain::services::presence_service::PresenceService;
use zondcc::domain::services::task_service::TaskService;
use zondcc::infrastructure::cache::memory_store::InMemoryKvStore;
use zondcc::infrastructure::cache::redis_client::RedisClient;
use zondcc::infrastructure::geolocation::GeoLocationService;
use zondcc::infrastructure::services::notification_service_impl::HttpNotificationService;
use zondcc::presentation::routes::{self, AppServices};
use zondcc::utils::telemetry;
use zondcc::workers::destinations_worker::DestinationsWorker;
use zondcc::workers::liveness_worker::LivenessWorker;
use zondcc::workers::manager::WorkerManager;
use zondcc::workers::processing_worker::ProcessingWorker;
use zondcc::workers::repeatable_worker::RepeatableWorker;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting zondcc...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    zondcc::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Connect to the store
    let store: Arc<dyn KvStore> = if settings.redis.is_memory() {
        warn!("Using in-process store, state is lost on restart");
        Arc::new(InMemoryKvStore::new())
    } else {
        let client = RedisClient::new(&settings.redis.url).await?;
        info!("Redis client initialized");
        Arc::new(client)
    };

    // 4. Start the pub/sub publisher
    let (notifier, publisher) = HttpNotificationService::new(&settings.notification)?;
    let notifier: Arc<dyn NotificationService> = Arc::new(notifier);
    let publisher_handle = publisher.start();
    info!("Publishing to {}", settings.notification.base_url);

    // 5. Initialize services
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
        resolver.clone(),
        settings.dispatch.clone(),
    );
    let geo = Arc::new(GeoLocationService::new(
        settings.geo.url.clone(),
        Duration::from_secs(settings.geo.timeout_seconds),
    ));

    // 6. Resend what was left over from the previous run
    match dispatch.resend_offline().await {
        Ok(count) => info!("Resent {} queued tasks", count),
        Err(e) => error!("Failed to resend queued tasks: {}", e),
    }
    match dispatch.resend_repeatable(true).await {
        Ok(count) => info!("Regenerated {} repeatable tasks", count),
        Err(e) => error!("Failed to regenerate repeatable tasks: {}", e),
    }

    // 7. Start workers
    let sweeps = &settings.sweeps;
    let mut worker_manager = WorkerManager::new();
    worker_manager.spawn(Arc::new(ProcessingWorker::new(
        dispatch.clone(),
        Duration::from_secs(sweeps.processing_interval_seconds),
    )));
    for role in [WorkerRole::Probe, WorkerRole::Manager] {
        worker_manager.spawn(Arc::new(LivenessWorker::new(
            presence.clone(),
            role,
            Duration::from_secs(sweeps.liveness_interval_seconds),
        )));
    }
    worker_manager.spawn(Arc::new(RepeatableWorker::new(
        dispatch.clone(),
        Duration::from_secs(sweeps.repeatable_interval_seconds),
    )));
    worker_manager.spawn(Arc::new(DestinationsWorker::new(
        resolver,
        Duration::from_secs(sweeps.destinations_interval_seconds),
    )));
    info!("{} workers started", worker_manager.len());

    // 8. Start HTTP server
    let app = routes::routes(AppServices {
        settings: settings.clone(),
        tasks,
        dispatch,
        presence,
        geo,
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { worker_manager.wait_for_shutdown().await })
        .await?;

    publisher_handle.abort();
    info!("Server stopped");
    Ok(())
}
