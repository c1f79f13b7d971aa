// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod task;
pub mod worker;

use crate::config::settings::Settings;
use crate::domain::models::worker::WorkerRole;
use crate::domain::services::dispatch_service::DispatchService;
use crate::domain::services::presence_service::PresenceService;
use crate::domain::services::task_service::TaskService;
use crate::infrastructure::geolocation::GeoLocationService;
use crate::presentation::handlers::dispatch_handler;
use axum::{routing::get, Extension, Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// HTTP层依赖的服务集合
#[derive(Clone)]
pub struct AppServices {
    pub settings: Arc<Settings>,
    pub tasks: TaskService,
    pub dispatch: DispatchService,
    pub presence: PresenceService,
    pub geo: Arc<GeoLocationService>,
}

/// 创建应用路由
///
/// # 参数
///
/// * `services` - 注入到各处理器的服务
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(services: AppServices) -> Router {
    let public_routes = Router::new()
        .route("/", get(online_probes))
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/dispatch/", get(dispatch_handler::dispatch));

    Router::new()
        .merge(public_routes)
        .merge(task::task_routes())
        .nest(
            "/zond",
            worker::worker_routes(WorkerRole::Probe, services.presence.clone()),
        )
        .nest(
            "/mngr",
            worker::worker_routes(WorkerRole::Manager, services.presence.clone()),
        )
        .layer(Extension(services.tasks))
        .layer(Extension(services.dispatch))
        .layer(Extension(services.presence))
        .layer(Extension(services.geo))
        .layer(Extension(services.settings))
        .layer(TraceLayer::new_for_http())
}

/// 在线探针ID列表
pub async fn online_probes(
    Extension(presence): Extension<PresenceService>,
) -> Json<Vec<String>> {
    Json(presence.online(WorkerRole::Probe).await)
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
