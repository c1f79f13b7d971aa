// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::dispatch_service::DispatchService;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::time::Duration;

/// 周期任务再生工作器
pub struct RepeatableWorker {
    dispatch: DispatchService,
    interval: Duration,
}

impl RepeatableWorker {
    pub fn new(dispatch: DispatchService, interval: Duration) -> Self {
        Self { dispatch, interval }
    }
}

#[async_trait]
impl Worker for RepeatableWorker {
    async fn tick(&self) -> Result<u64, WorkerError> {
        Ok(self.dispatch.resend_repeatable(false).await?)
    }

    fn name(&self) -> &str {
        "repeatable"
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}
