// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::routing::{get, post};
use axum::{middleware, Extension, Router};

use crate::domain::models::worker::WorkerRole;
use crate::domain::services::presence_service::PresenceService;
use crate::presentation::handlers::worker_handler;
use crate::presentation::middleware::worker_auth_middleware::{
    worker_auth_middleware, WorkerAuthState,
};

/// 创建执行者路由，挂载在 `/zond` 或 `/mngr` 下
///
/// 领取、上报和心跳应答需要通过身份中间件
pub fn worker_routes(role: WorkerRole, presence: PresenceService) -> Router {
    let protected = Router::new()
        .route("/pong", post(worker_handler::pong))
        .route("/task/block", post(worker_handler::block_task))
        .route("/task/result", post(worker_handler::submit_result))
        .route_layer(middleware::from_fn_with_state(
            WorkerAuthState { role, presence },
            worker_auth_middleware,
        ));

    let open = Router::new()
        .route("/create", post(worker_handler::create_worker))
        .route(
            "/sub",
            get(worker_handler::subscribe).post(worker_handler::subscribe),
        )
        .route(
            "/unsub",
            get(worker_handler::unsubscribe).post(worker_handler::unsubscribe),
        )
        .route("/my", get(worker_handler::my_workers));

    Router::new()
        .merge(open)
        .merge(protected)
        .layer(Extension(role))
}
