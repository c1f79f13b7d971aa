// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供任务队列和调度功能
/// 负责键命名空间、任务排队、处理中租约以及周期任务时间桶
pub mod keys;
pub mod scheduler;
pub mod task_queue;
