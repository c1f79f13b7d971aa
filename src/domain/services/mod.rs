// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 创建者服务（creator_service）：外部身份到内部创建者ID的映射
/// - 目的地解析（destination_resolver）：路由提示到发布主题
/// - 调度服务（dispatch_service）：领取、结果回传与恢复
/// - 通知服务（notification_service）：推送网关抽象
/// - 在线状态服务（presence_service）：注册、订阅与心跳
/// - 任务服务（task_service）：任务创建与查询
pub mod creator_service;
pub mod destination_resolver;
pub mod dispatch_service;
pub mod notification_service;
pub mod presence_service;
pub mod task_service;
