// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::routing::{get, post};
use axum::Router;

use crate::presentation::handlers::task_handler;

/// 创建任务相关路由
///
/// # 返回值
///
/// 返回配置好的 `/task` 路由
pub fn task_routes() -> Router {
    Router::new()
        .route("/task/create", post(task_handler::create_task))
        .route("/task/my", get(task_handler::my_tasks))
        .route("/task/repeatable", get(task_handler::repeatable_tasks))
        .route(
            "/task/repeatable/remove",
            post(task_handler::remove_repeatable),
        )
}
