// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 探针与管理器共用的处理器
//!
//! 角色通过路由层注入的 `Extension<WorkerRole>` 区分

use crate::application::dto::api_response::ApiResponseDto;
use crate::application::dto::task_request::PageQueryDto;
use crate::application::dto::worker_request::CreateWorkerRequestDto;
use crate::domain::models::task::Task;
use crate::domain::models::worker::{Worker, WorkerRole};
use crate::domain::services::dispatch_service::DispatchService;
use crate::domain::services::presence_service::{PresenceService, MAX_CHANNEL_HEADERS};
use crate::presentation::errors::AppError;
use crate::presentation::extractors::identity::{AuthenticatedWorker, CallerIdentity};
use crate::utils::pagination::Page;
use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    Form, Json,
};
use tracing::warn;

/// 订阅回调中携带频道的请求头前缀
pub const CHANNEL_HEADER_PREFIX: &str = "X-Channel-Id";

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// 解析执行者上报的消息体，格式错误时按空消息处理
fn decode_message(body: &str) -> Task {
    Task::decode(body).unwrap_or_else(|e| {
        warn!("Failed to decode worker message: {}", e);
        Task::default()
    })
}

fn dispatch_reply(outcome: Result<(), impl ToString>) -> Json<ApiResponseDto> {
    match outcome {
        Ok(()) => Json(ApiResponseDto::ok_message()),
        Err(e) => Json(ApiResponseDto::error_message(e.to_string())),
    }
}

/// 注册执行者
pub async fn create_worker(
    Extension(role): Extension<WorkerRole>,
    Extension(presence): Extension<PresenceService>,
    CallerIdentity(user): CallerIdentity,
    Form(payload): Form<CreateWorkerRequestDto>,
) -> Json<ApiResponseDto> {
    let worker = presence.register(role, payload.name.trim(), &user).await;
    Json(ApiResponseDto::created(&worker.id))
}

/// 推送网关的上线回调
///
/// # 返回值
///
/// * `Ok(Json<ApiResponseDto>)` - 已上线
/// * `Err(AppError)` - 执行者未注册，403
pub async fn subscribe(
    Extension(role): Extension<WorkerRole>,
    Extension(presence): Extension<PresenceService>,
    headers: HeaderMap,
) -> Result<Json<ApiResponseDto>, AppError> {
    let worker_id = header_value(&headers, role.identity_header());
    let channels: Vec<String> = (0..MAX_CHANNEL_HEADERS)
        .map(|i| header_value(&headers, &format!("{}{}", CHANNEL_HEADER_PREFIX, i)))
        .filter(|channel| !channel.is_empty())
        .collect();

    presence.subscribe(role, &worker_id, &channels).await?;
    Ok(Json(ApiResponseDto::ok()))
}

/// 推送网关的下线回调
pub async fn unsubscribe(
    Extension(role): Extension<WorkerRole>,
    Extension(presence): Extension<PresenceService>,
    headers: HeaderMap,
) -> Json<ApiResponseDto> {
    let worker_id = header_value(&headers, role.identity_header());
    if !worker_id.is_empty() {
        presence.unsubscribe(role, &worker_id).await;
    }
    Json(ApiResponseDto::ok())
}

/// 应答心跳挑战，消息体为 `{"uuid":"<challenge>"}`
pub async fn pong(
    Extension(presence): Extension<PresenceService>,
    Extension(AuthenticatedWorker(worker_id)): Extension<AuthenticatedWorker>,
    body: String,
) -> Json<ApiResponseDto> {
    let message = decode_message(&body);
    if presence.pong(&worker_id, &message.id).await {
        Json(ApiResponseDto::ok())
    } else {
        Json(ApiResponseDto::error_message("unexpected challenge"))
    }
}

/// 领取任务，消息体为 `{"action":"block","uuid":"<task>"}`
pub async fn block_task(
    Extension(role): Extension<WorkerRole>,
    Extension(dispatch): Extension<DispatchService>,
    Extension(AuthenticatedWorker(worker_id)): Extension<AuthenticatedWorker>,
    body: String,
) -> Json<ApiResponseDto> {
    let message = decode_message(&body);
    dispatch_reply(dispatch.claim(role, &worker_id, &message.id).await)
}

/// 上报任务结果，消息体为 `{"action":"result","uuid":"<task>","result":"..."}`
pub async fn submit_result(
    Extension(role): Extension<WorkerRole>,
    Extension(dispatch): Extension<DispatchService>,
    Extension(AuthenticatedWorker(worker_id)): Extension<AuthenticatedWorker>,
    body: String,
) -> Json<ApiResponseDto> {
    let message = decode_message(&body);
    dispatch_reply(dispatch.submit_result(role, &worker_id, &message).await)
}

/// 调用方注册的执行者列表
pub async fn my_workers(
    Extension(role): Extension<WorkerRole>,
    Extension(presence): Extension<PresenceService>,
    CallerIdentity(user): CallerIdentity,
    Query(query): Query<PageQueryDto>,
) -> Json<Page<Worker>> {
    Json(presence.list_user_workers(role, &user, query.page()).await)
}
