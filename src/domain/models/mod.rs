// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 任务（task）：可调度的探测任务，同时承载执行者上报的协议消息
/// - 执行者（worker）：已注册的探针和管理器
/// - 目的地（destination）：路由提示与在线目的地快照
pub mod destination;
pub mod task;
pub mod worker;
