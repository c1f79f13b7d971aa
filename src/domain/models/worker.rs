// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 执行者角色
///
/// 探针（zond）执行测量任务，管理器（mngr）领取 `measurement` 类任务。
/// 两者共用同一套领取/上报状态机，差异只在键名和约束上。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerRole {
    Probe,
    Manager,
}

impl WorkerRole {
    /// 识别执行者身份的请求头
    pub fn identity_header(&self) -> &'static str {
        match self {
            WorkerRole::Probe => "X-ZondUuid",
            WorkerRole::Manager => "X-MngrUuid",
        }
    }

    /// 路由前缀
    pub fn path_segment(&self) -> &'static str {
        match self {
            WorkerRole::Probe => "zond",
            WorkerRole::Manager => "mngr",
        }
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// 已注册的执行者（探针或管理器）
///
/// 注册是永久的；在线状态单独跟踪
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Worker {
    #[serde(rename = "uuid")]
    pub id: String,
    pub name: String,
    #[serde(rename = "creator")]
    pub creator_id: String,
    #[serde(rename = "created")]
    pub created_at: i64,
    #[serde(rename = "updated")]
    pub updated_at: i64,
}

impl Worker {
    /// 创建新的执行者
    ///
    /// # 参数
    ///
    /// * `name` - 名称，为空时使用生成的ID
    /// * `creator_id` - 创建者ID
    /// * `now` - 当前unix时间戳
    pub fn new(name: &str, creator_id: &str, now: i64) -> Self {
        let id = Uuid::new_v4().to_string();
        let name = if name.is_empty() {
            id.clone()
        } else {
            name.to_string()
        };
        Self {
            id,
            name,
            creator_id: creator_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
