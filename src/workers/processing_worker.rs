// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::dispatch_service::DispatchService;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::time::Duration;

/// 处理中任务回收工作器
///
/// 租约过期的任务会被重新入队并重新发布
pub struct ProcessingWorker {
    dispatch: DispatchService,
    interval: Duration,
}

impl ProcessingWorker {
    pub fn new(dispatch: DispatchService, interval: Duration) -> Self {
        Self { dispatch, interval }
    }
}

#[async_trait]
impl Worker for ProcessingWorker {
    async fn tick(&self) -> Result<u64, WorkerError> {
        Ok(self.dispatch.reset_processing().await?)
    }

    fn name(&self) -> &str {
        "processing"
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}
