// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括错误回退、分页、目标校验和遥测初始化
pub mod errors;
pub mod pagination;
pub mod telemetry;
pub mod validators;
