// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::destination_resolver::DestinationResolver;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::time::Duration;

/// 定期广播在线目的地快照
pub struct DestinationsWorker {
    resolver: DestinationResolver,
    interval: Duration,
}

impl DestinationsWorker {
    pub fn new(resolver: DestinationResolver, interval: Duration) -> Self {
        Self { resolver, interval }
    }
}

#[async_trait]
impl Worker for DestinationsWorker {
    async fn tick(&self) -> Result<u64, WorkerError> {
        let snapshot = self.resolver.publish_active_destinations().await;
        Ok(snapshot.zonds.len() as u64)
    }

    fn name(&self) -> &str {
        "destinations"
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}
