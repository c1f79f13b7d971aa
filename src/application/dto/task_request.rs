// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::task_service::TaskDraft;
use serde::{Deserialize, Serialize};

/// 任务创建请求DTO（表单）
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CreateTaskRequestDto {
    /// 目标，如IP、主机名或URL
    pub ip: String,

    /// 任务类型：ping/head/dns/traceroute
    #[serde(rename = "type")]
    pub kind: String,

    /// 路由提示，如 `zond:city:Berlin`
    pub dest: String,

    /// 重复间隔
    pub repeat: String,

    /// `task` 或 `measurement`
    pub maintype: String,

    /// 重复次数提示
    pub taskcount: String,
}

impl From<CreateTaskRequestDto> for TaskDraft {
    fn from(dto: CreateTaskRequestDto) -> Self {
        TaskDraft {
            kind: dto.kind,
            param: dto.ip.trim().to_string(),
            repeat: dto.repeat,
            dest: dto.dest,
            main_type: dto.maintype,
            count: dto.taskcount,
        }
    }
}

/// 按ID操作的请求DTO（表单）
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UuidRequestDto {
    pub uuid: String,
}

/// 分页查询参数
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PageQueryDto {
    /// 页码，无法解析时按第1页处理
    pub page: Option<String>,
}

impl PageQueryDto {
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}
