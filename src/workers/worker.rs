// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;
use std::time::Duration;

/// Worker trait定义
///
/// 所有周期性后台扫描都必须实现此trait，由 `WorkerManager` 按固定间隔驱动
#[async_trait]
pub trait Worker: Send + Sync {
    /// 执行一轮扫描
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 本轮处理的条目数
    /// * `Err(WorkerError)` - 本轮中止，下一轮照常进行
    async fn tick(&self) -> Result<u64, WorkerError>;

    /// 获取工作器名称
    fn name(&self) -> &str;

    /// 两轮之间的间隔
    fn interval(&self) -> Duration;
}
