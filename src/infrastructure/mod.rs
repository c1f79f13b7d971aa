// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 缓存（cache）：键值存储的Redis与内存实现
/// - 地理定位（geolocation）：订阅者IP到地理频道的查询
/// - 指标（metrics）：Prometheus导出器
/// - 服务实现（services）：发布订阅通知的投递
///
/// 基础设施层依赖于领域层的抽象接口。
pub mod cache;
pub mod geolocation;
pub mod metrics;
pub mod services;
