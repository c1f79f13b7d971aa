// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 执行者注册请求DTO（表单）
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CreateWorkerRequestDto {
    /// 名称，为空时使用生成的ID
    pub name: String,
}
