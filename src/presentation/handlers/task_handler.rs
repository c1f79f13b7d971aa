// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::api_response::ApiResponseDto;
use crate::application::dto::task_request::{CreateTaskRequestDto, PageQueryDto, UuidRequestDto};
use crate::domain::models::task::Task;
use crate::domain::services::task_service::{TaskDraft, TaskService};
use crate::presentation::errors::AppError;
use crate::presentation::extractors::identity::CallerIdentity;
use crate::utils::pagination::Page;
use axum::{
    extract::{Extension, Query},
    Form, Json,
};

/// 创建任务
///
/// # 参数
///
/// * `tasks` - 任务服务
/// * `caller` - 调用方身份
/// * `payload` - 表单：`ip`、`type`、`dest`、`repeat`、`maintype`、`taskcount`
///
/// # 返回值
///
/// * `Ok(Json<ApiResponseDto>)` - `{"status":"ok"}`
/// * `Err(AppError)` - 校验失败，400 `{"status":"error","error":...}`
pub async fn create_task(
    Extension(tasks): Extension<TaskService>,
    CallerIdentity(user): CallerIdentity,
    Form(payload): Form<CreateTaskRequestDto>,
) -> Result<Json<ApiResponseDto>, AppError> {
    let draft = TaskDraft::from(payload);
    tasks.create(&draft, &user).await?;
    Ok(Json(ApiResponseDto::ok()))
}

/// 调用方的任务列表
pub async fn my_tasks(
    Extension(tasks): Extension<TaskService>,
    CallerIdentity(user): CallerIdentity,
    Query(query): Query<PageQueryDto>,
) -> Json<Page<Task>> {
    Json(tasks.list_user_tasks(&user, query.page()).await)
}

/// 所有周期任务快照
pub async fn repeatable_tasks(Extension(tasks): Extension<TaskService>) -> Json<Vec<Task>> {
    Json(tasks.list_repeatable().await)
}

/// 删除周期任务的所有快照
pub async fn remove_repeatable(
    Extension(tasks): Extension<TaskService>,
    Form(payload): Form<UuidRequestDto>,
) -> Result<Json<ApiResponseDto>, AppError> {
    tasks.remove_repeatable(payload.uuid.trim()).await?;
    Ok(Json(ApiResponseDto::ok()))
}
