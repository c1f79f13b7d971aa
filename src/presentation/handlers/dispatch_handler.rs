// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::models::task::MANAGER_TOPIC;
use crate::domain::models::worker::WorkerRole;
use crate::domain::services::presence_service::PresenceService;
use crate::infrastructure::geolocation::GeoLocationService;
use crate::queue::keys;
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

pub const ACCEL_REDIRECT_HEADER: &str = "X-Accel-Redirect";
pub const ACCEL_BUFFERING_HEADER: &str = "X-Accel-Buffering";
pub const INTERNAL_SUB_PREFIX: &str = "/internal/sub/";

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn redirect(status: StatusCode, location: &str) -> Response {
    let mut response = status.into_response();
    let response_headers = response.headers_mut();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response_headers.insert(ACCEL_REDIRECT_HEADER, value);
        }
        Err(e) => warn!("Invalid redirect location {:?}: {}", location, e),
    }
    response_headers.insert(ACCEL_BUFFERING_HEADER, HeaderValue::from_static("no"));
    response
}

/// 订阅路由
///
/// 根据调用方身份把长连接内部重定向到对应的推送频道：
/// 探针订阅专属主题、地理频道和公共任务；管理器订阅 `mngrtasks` 与专属主题；
/// 匿名观察者订阅目的地快照和完成通知
///
/// # 返回值
///
/// 带 `X-Accel-Redirect` 的空响应，未注册的执行者返回400并重定向到 `/404`
pub async fn dispatch(
    Extension(presence): Extension<PresenceService>,
    Extension(geo): Extension<Arc<GeoLocationService>>,
    Extension(settings): Extension<Arc<Settings>>,
    headers: HeaderMap,
) -> Response {
    let ip = header_value(&headers, "X-Forwarded-For");
    let probe_id = header_value(&headers, WorkerRole::Probe.identity_header());
    let manager_id = header_value(&headers, WorkerRole::Manager.identity_header());

    let location = if probe_id.len() == 36 {
        if !presence.is_registered(WorkerRole::Probe, probe_id).await {
            warn!("zond uuid not found: {}, ip {}", probe_id, ip);
            return redirect(StatusCode::BAD_REQUEST, "/404");
        }
        let channels = geo.channels_for_ip(ip).await.join(",");
        format!(
            "{}{},{},{}",
            INTERNAL_SUB_PREFIX,
            keys::dedicated_topic(WorkerRole::Probe, probe_id),
            channels,
            ip
        )
    } else if manager_id.len() == 36 {
        if !presence.is_registered(WorkerRole::Manager, manager_id).await {
            warn!("mngr uuid not found: {}, ip {}", manager_id, ip);
            return redirect(StatusCode::BAD_REQUEST, "/404");
        }
        format!(
            "{}{},{},{}",
            INTERNAL_SUB_PREFIX,
            MANAGER_TOPIC,
            keys::dedicated_topic(WorkerRole::Manager, manager_id),
            ip
        )
    } else {
        let mut location = format!(
            "{}{},{},{}",
            INTERNAL_SUB_PREFIX,
            keys::DESTINATIONS_TOPIC,
            keys::DONE_TOPIC,
            ip
        );
        if let Some(fqdn) = settings.server.fqdn.as_deref().filter(|f| !f.is_empty()) {
            location.push(',');
            location.push_str(fqdn);
        }
        location
    };

    info!("{}", location);
    redirect(StatusCode::OK, &location)
}
