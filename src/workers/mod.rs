// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 周期性后台扫描：租约回收、心跳、周期任务再生和目的地广播
pub mod destinations_worker;
pub mod liveness_worker;
pub mod manager;
pub mod processing_worker;
pub mod repeatable_worker;
pub mod worker;

pub use worker::Worker;
