// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：任务、执行者和目的地
/// - 仓库接口（repositories）：键值存储抽象
/// - 服务（services）：任务创建、领取/上报状态机、在线状态跟踪
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod services;
