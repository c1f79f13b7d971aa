// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 存储键命名空间
//!
//! 所有键名集中在此处，探针与管理器的差异通过 `WorkerRole` 分派。

use crate::domain::models::worker::WorkerRole;

pub const QUEUED: &str = "tasks-new";
pub const PROCESSING: &str = "tasks-process";
pub const DONE: &str = "tasks-done";
pub const REPEATABLE_PREFIX: &str = "tasks-repeatable-";
pub const PROBE_BUSY: &str = "zond-busy";

pub const CITY_TAGS: &str = "zond:city";
pub const COUNTRY_TAGS: &str = "zond:country";
pub const ASN_TAGS: &str = "zond:asn";
pub const TAG_HASHES: [&str; 3] = [CITY_TAGS, COUNTRY_TAGS, ASN_TAGS];

pub const DONE_TOPIC: &str = "tasks/done";
pub const DESTINATIONS_TOPIC: &str = "destinations";

/// 处理中租约的标记值
pub const LEASE_MARKER: &str = "1";

pub fn task(id: &str) -> String {
    format!("task/{}", id)
}

pub fn repeatable_bucket(bucket: i64) -> String {
    format!("{}{}", REPEATABLE_PREFIX, bucket)
}

pub fn repeatable_pattern() -> String {
    format!("{}*", REPEATABLE_PREFIX)
}

/// 处理中集合的成员 `<worker>/<task>`
pub fn processing_pair(worker_id: &str, task_id: &str) -> String {
    format!("{}/{}", worker_id, task_id)
}

/// 将 `<worker>/<task>` 拆分为两部分
pub fn split_processing_pair(pair: &str) -> Option<(&str, &str)> {
    let (worker_id, task_id) = pair.split_once('/')?;
    if worker_id.is_empty() || task_id.is_empty() || task_id.contains('/') {
        return None;
    }
    Some((worker_id, task_id))
}

pub fn lease(worker_id: &str, task_id: &str) -> String {
    format!("{}/{}/processing", worker_id, task_id)
}

pub fn done_entry(worker_id: &str, task_id: &str, result: &str) -> String {
    format!("{}/{}/{}", worker_id, task_id, result)
}

pub fn alive(worker_id: &str) -> String {
    format!("{}/alive", worker_id)
}

pub fn user_uuid(external_id: &str) -> String {
    format!("user/uuid/{}", external_id)
}

pub fn user_tasks(creator_id: &str) -> String {
    format!("user/tasks/{}", creator_id)
}

/// 已注册执行者集合
pub fn registry(role: WorkerRole) -> &'static str {
    match role {
        WorkerRole::Probe => "zonds",
        WorkerRole::Manager => "mngrs",
    }
}

pub fn worker_record(role: WorkerRole, worker_id: &str) -> String {
    format!("{}/{}", registry(role), worker_id)
}

/// 在线集合
pub fn online(role: WorkerRole) -> &'static str {
    match role {
        WorkerRole::Probe => "Zond-online",
        WorkerRole::Manager => "mngr-online",
    }
}

pub fn user_workers(role: WorkerRole, creator_id: &str) -> String {
    format!("user/{}/{}", registry(role), creator_id)
}

/// 忙碌标记集合，管理器不受单任务限制
pub fn busy(role: WorkerRole) -> Option<&'static str> {
    match role {
        WorkerRole::Probe => Some(PROBE_BUSY),
        WorkerRole::Manager => None,
    }
}

/// 执行者专属主题，用于心跳挑战和单点下发
pub fn dedicated_topic(role: WorkerRole, worker_id: &str) -> String {
    match role {
        WorkerRole::Probe => format!("zond:{}", worker_id),
        WorkerRole::Manager => format!("mngr{}", worker_id),
    }
}
