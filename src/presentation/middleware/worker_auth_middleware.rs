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

use crate::domain::models::worker::WorkerRole;
use crate::domain::services::presence_service::PresenceService;
use crate::presentation::extractors::identity::AuthenticatedWorker;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// 执行者认证状态
#[derive(Clone)]
pub struct WorkerAuthState {
    pub role: WorkerRole,
    pub presence: PresenceService,
}

/// 执行者身份中间件
///
/// 角色请求头必须是36个字符且已注册，通过后把执行者ID放入请求扩展
///
/// # 参数
///
/// * `state` - 认证状态
/// * `req` - HTTP请求
/// * `next` - 下一个中间件
///
/// # 返回值
///
/// 认证失败时返回401 `Not authorized`
pub async fn worker_auth_middleware(
    State(state): State<WorkerAuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let worker_id = req
        .headers()
        .get(state.role.identity_header())
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if worker_id.len() != 36 || !state.presence.is_registered(state.role, &worker_id).await {
        debug!(
            "Rejected {} request to {} with identity {:?}",
            state.role,
            req.uri().path(),
            worker_id
        );
        return (StatusCode::UNAUTHORIZED, "Not authorized").into_response();
    }

    req.extensions_mut().insert(AuthenticatedWorker(worker_id));
    next.run(req).await
}
