// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::worker::Worker;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// 工作管理器
///
/// 每个工作器运行在独立的tokio任务中，首轮在一个间隔之后执行
#[derive(Default)]
pub struct WorkerManager {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启动工作器循环
    ///
    /// # 参数
    ///
    /// * `worker` - 要周期运行的工作器
    pub fn spawn(&mut self, worker: Arc<dyn Worker>) {
        let period = worker.interval();
        info!("Starting {} worker, every {:?}", worker.name(), period);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match worker.tick().await {
                    Ok(0) => debug!("{} worker: nothing to do", worker.name()),
                    Ok(count) => info!("{} worker processed {} entries", worker.name(), count),
                    Err(e) => error!("{} worker failed: {}", worker.name(), e),
                }
            }
        });
        self.handles.push(handle);
    }

    /// 正在运行的工作器数量
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 停止所有工作器
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down successfully");
    }

    /// 等待关闭信号并关闭工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::WorkerError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    struct CountingWorker {
        ticks: Arc<AtomicU64>,
    }

    #[async_trait]
    impl Worker for CountingWorker {
        async fn tick(&self) -> Result<u64, WorkerError> {
            let n = self.ticks.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(WorkerError::InternalError("first tick fails".to_string()))
            } else {
                Ok(n)
            }
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn interval(&self) -> Duration {
            Duration::from_secs(10)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_runs_after_each_interval_and_survives_errors() {
        // Given
        let ticks = Arc::new(AtomicU64::new(0));
        let mut manager = WorkerManager::new();

        // When
        manager.spawn(Arc::new(CountingWorker { ticks: ticks.clone() }));
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Then: 首轮不会立即执行
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        manager.shutdown();
        assert!(manager.is_empty());
    }
}
