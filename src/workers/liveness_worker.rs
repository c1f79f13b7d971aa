// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::worker::WorkerRole;
use crate::domain::services::presence_service::PresenceService;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::time::Duration;

/// 心跳工作器，每个角色各运行一个
pub struct LivenessWorker {
    presence: PresenceService,
    role: WorkerRole,
    name: String,
    interval: Duration,
}

impl LivenessWorker {
    pub fn new(presence: PresenceService, role: WorkerRole, interval: Duration) -> Self {
        Self {
            presence,
            role,
            name: format!("{}-liveness", role),
            interval,
        }
    }
}

#[async_trait]
impl Worker for LivenessWorker {
    async fn tick(&self) -> Result<u64, WorkerError> {
        Ok(self.presence.check_alive(self.role).await?)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}
