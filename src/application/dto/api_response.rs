// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 统一的状态响应
///
/// 创建类接口使用 `error` 字段，执行者协议接口使用 `message` 字段
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiResponseDto {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl ApiResponseDto {
    fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            message: None,
            error: None,
            uuid: None,
        }
    }

    /// `{"status":"ok"}`
    pub fn ok() -> Self {
        Self::with_status("ok")
    }

    /// `{"status":"ok","message":"ok"}`
    pub fn ok_message() -> Self {
        Self {
            message: Some("ok".to_string()),
            ..Self::ok()
        }
    }

    /// `{"status":"ok","uuid":"<id>"}`
    pub fn created(uuid: &str) -> Self {
        Self {
            uuid: Some(uuid.to_string()),
            ..Self::ok()
        }
    }

    /// `{"status":"error","error":"<reason>"}`
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::with_status("error")
        }
    }

    /// `{"status":"error","message":"<reason>"}`
    pub fn error_message(reason: impl Into<String>) -> Self {
        Self {
            message: Some(reason.into()),
            ..Self::with_status("error")
        }
    }
}
