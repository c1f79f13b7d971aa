// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DispatchSettings;
use crate::domain::models::task::{floor_to_bucket, Task, BUCKET_SECONDS};
use crate::domain::models::worker::WorkerRole;
use crate::domain::repositories::kv_store::{KvStore, StoreError};
use crate::domain::services::notification_service::NotificationService;
use crate::queue::keys;
use crate::queue::scheduler::RepeatScheduler;
use crate::queue::task_queue::TaskQueue;
use crate::utils::errors::LogFallback;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 执行者上报结果时使用的动作
pub const RESULT_ACTION: &str = "result";

/// 领取/上报错误
///
/// 错误文本即回复体中的 `message` 字段
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("task not found")]
    NotFound,

    #[error("only one task at time is allowed")]
    Busy,

    #[error("unexpected action")]
    UnexpectedAction,
}

/// 调度服务
///
/// 探针与管理器共用的任务状态机：
/// `Queued -> Claimed(worker) -> Done`，租约过期时 `Claimed -> Queued`。
/// 并发安全只依赖集合移除返回的实际数量。
#[derive(Clone)]
pub struct DispatchService {
    queue: TaskQueue,
    scheduler: RepeatScheduler,
    notifier: Arc<dyn NotificationService>,
    settings: DispatchSettings,
}

impl DispatchService {
    pub fn new(
        store: Arc<dyn KvStore>,
        notifier: Arc<dyn NotificationService>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            queue: TaskQueue::new(store.clone()),
            scheduler: RepeatScheduler::new(store),
            notifier,
            settings,
        }
    }

    /// 领取任务
    ///
    /// # 参数
    ///
    /// * `role` - 执行者角色
    /// * `worker_id` - 执行者ID
    /// * `task_id` - 任务ID
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 领取成功
    /// * `Err(DispatchError::Busy)` - 探针已有进行中的任务，队列不受影响
    /// * `Err(DispatchError::NotFound)` - 任务不在待领取集合中或已被他人领取
    pub async fn claim(
        &self,
        role: WorkerRole,
        worker_id: &str,
        task_id: &str,
    ) -> Result<(), DispatchError> {
        debug!("{} {} wants to block {}", role, worker_id, task_id);

        let busy = self
            .queue
            .is_busy(role, worker_id)
            .await
            .or_log_default("Failed to read busy marker");
        if busy {
            return Err(DispatchError::Busy);
        }

        let taken = self
            .queue
            .take_queued(task_id)
            .await
            .or_log_default("Failed to take queued task");
        if !taken {
            return Err(DispatchError::NotFound);
        }

        let lease = self.lease_for(role, task_id).await;
        if let Err(e) = self.queue.begin_processing(worker_id, task_id, lease).await {
            error!("Failed to record processing of {} by {}: {}", task_id, worker_id, e);
        }
        if let Err(e) = self.queue.mark_busy(role, worker_id).await {
            error!("Failed to mark {} busy: {}", worker_id, e);
        }

        metrics::counter!("tasks_claimed_total").increment(1);
        info!("{} {} claimed task {}", role, worker_id, task_id);
        Ok(())
    }

    /// 上报任务结果
    ///
    /// 探针的忙碌标记在任何检查之前先被清除
    ///
    /// # 参数
    ///
    /// * `role` - 执行者角色
    /// * `worker_id` - 执行者ID
    /// * `report` - 上报消息，使用其中的 `action`、`uuid` 和 `result`
    pub async fn submit_result(
        &self,
        role: WorkerRole,
        worker_id: &str,
        report: &Task,
    ) -> Result<(), DispatchError> {
        debug!("{} {} wants to {} {}", role, worker_id, report.action, report.id);

        if let Err(e) = self.queue.clear_busy(role, worker_id).await {
            error!("Failed to clear busy marker of {}: {}", worker_id, e);
        }

        if report.action != RESULT_ACTION {
            return Err(DispatchError::UnexpectedAction);
        }

        let processing = self
            .queue
            .is_processing(worker_id, &report.id)
            .await
            .or_log_default("Failed to check processing entry");
        if !processing {
            return Err(DispatchError::NotFound);
        }

        let finished = self
            .queue
            .finish_processing(worker_id, &report.id)
            .await
            .or_log_default("Failed to remove processing entry");
        if !finished {
            return Err(DispatchError::NotFound);
        }

        if let Err(e) = self
            .queue
            .record_done(worker_id, &report.id, &report.result)
            .await
        {
            error!("Failed to record completion of {}: {}", report.id, e);
        }

        // A missing or undecodable record is merged into an empty task.
        let mut task = self
            .queue
            .load(&report.id)
            .await
            .or_log_default("Failed to load task")
            .unwrap_or_default();
        task.result = report.result.clone();
        task.set_worker_id(role, worker_id);
        task.updated_at = Utc::now().timestamp();

        let encoded = task.encode();
        if let Err(e) = self.queue.store().set(&keys::task(&report.id), &encoded, None).await {
            error!("Failed to persist result of {}: {}", report.id, e);
        }
        self.notifier.publish(keys::DONE_TOPIC, encoded);

        metrics::counter!("tasks_completed_total").increment(1);
        info!("{} {} completed task {}", role, worker_id, report.id);
        Ok(())
    }

    /// 回收租约过期的处理中任务
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 重新入队的任务数
    /// * `Err(StoreError)` - 无法列出处理中集合，本轮中止
    pub async fn reset_processing(&self) -> Result<u64, StoreError> {
        let pairs = self.queue.processing_pairs().await?;

        let mut requeued = 0;
        for pair in pairs {
            let Some((worker_id, task_id)) = keys::split_processing_pair(&pair) else {
                warn!("Malformed processing entry {}", pair);
                continue;
            };

            let valid = self
                .queue
                .lease_is_valid(worker_id, task_id)
                .await
                .or_log_default("Failed to read lease");
            if valid {
                continue;
            }

            // The removal count decides who owns the task: a result may have won it first.
            match self.queue.finish_processing(worker_id, task_id).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Processing entry {} already removed", pair);
                    continue;
                }
                Err(e) => {
                    error!("Failed to remove processing entry {}: {}", pair, e);
                    continue;
                }
            }
            info!("Removed outdated task {} of {}", task_id, worker_id);
            // The busy set only holds probes, clearing it for a manager id is a no-op.
            if let Err(e) = self.queue.clear_busy(WorkerRole::Probe, worker_id).await {
                error!("Failed to clear busy marker of {}: {}", worker_id, e);
            }
            if let Err(e) = self.queue.enqueue(task_id).await {
                error!("Failed to requeue {}: {}", task_id, e);
                continue;
            }

            match self.queue.load(task_id).await.or_log_default("Failed to load task") {
                Some(task) => {
                    self.notifier.publish(task.publish_topic(), task.encode());
                    info!("Task {} resent to queue", task_id);
                }
                None => warn!("Requeued task {} has no readable record", task_id),
            }
            metrics::counter!("tasks_requeued_total").increment(1);
            requeued += 1;
        }

        Ok(requeued)
    }

    /// 再生当前时间桶的周期任务，`from_past` 为真时补齐回溯窗口内的所有时间桶
    pub async fn resend_repeatable(&self, from_past: bool) -> Result<u64, StoreError> {
        let now = Utc::now().timestamp();
        if from_past {
            self.catch_up_repeatable(now, self.settings.history_hours)
                .await
        } else {
            self.resend_repeatable_at(now).await
        }
    }

    /// 补齐从 `now - history_hours` 到 `now` 的每个5分钟时间桶
    pub async fn catch_up_repeatable(&self, now: i64, history_hours: i64) -> Result<u64, StoreError> {
        let current = floor_to_bucket(now);
        let mut bucket = floor_to_bucket(now - history_hours.max(0) * 3600);

        let mut regenerated = 0;
        while bucket <= current {
            regenerated += self.regenerate_bucket(bucket, now).await?;
            bucket += BUCKET_SECONDS;
        }
        Ok(regenerated)
    }

    /// 再生 `now` 所在时间桶中的周期任务
    pub async fn resend_repeatable_at(&self, now: i64) -> Result<u64, StoreError> {
        self.regenerate_bucket(floor_to_bucket(now), now).await
    }

    async fn regenerate_bucket(&self, bucket: i64, now: i64) -> Result<u64, StoreError> {
        let bucket_key = keys::repeatable_bucket(bucket);
        let snapshots = self.scheduler.snapshots(bucket).await?;
        let current = floor_to_bucket(now);

        let mut regenerated = 0;
        for raw in snapshots {
            let mut task = match Task::decode(&raw) {
                Ok(task) => task,
                Err(e) => {
                    error!("Undecodable repeatable snapshot in {}: {}", bucket_key, e);
                    continue;
                }
            };

            if !task.repeat.is_repeating() {
                warn!("Dropping non-repeating snapshot {} from {}", task.id, bucket_key);
                if let Err(e) = self.scheduler.remove_snapshot(&bucket_key, &raw).await {
                    error!("Failed to drop snapshot from {}: {}", bucket_key, e);
                }
                continue;
            }

            if task.parent_id.is_empty() {
                task.parent_id = task.id.clone();
            }
            task.id = Uuid::new_v4().to_string();
            task.created_at = current;

            if let Err(e) = self.queue.save(&task).await {
                error!("Failed to persist regenerated task {}: {}", task.id, e);
                continue;
            }
            if let Err(e) = self.queue.enqueue(&task.id).await {
                error!("Failed to enqueue regenerated task {}: {}", task.id, e);
            }
            if let Err(e) = self.queue.index_for_creator(&task.creator_id, &task.id).await {
                error!("Failed to index regenerated task {}: {}", task.id, e);
            }
            match self.scheduler.schedule(&task, now).await {
                Ok(next) => debug!("Task {} next start will be at {}", task.parent_id, next),
                Err(e) => error!("Failed to reschedule {}: {}", task.parent_id, e),
            }

            self.notifier.publish(task.publish_topic(), task.encode());

            if let Err(e) = self.scheduler.remove_snapshot(&bucket_key, &raw).await {
                error!("Failed to remove consumed snapshot from {}: {}", bucket_key, e);
            }

            metrics::counter!("tasks_regenerated_total").increment(1);
            regenerated += 1;
        }

        if regenerated > 0 {
            info!("Regenerated {} repeatable tasks from {}", regenerated, bucket_key);
        }
        Ok(regenerated)
    }

    /// 启动时重新发布所有待领取任务
    ///
    /// 已带有结果的记录不再发布，直接移出待领取集合
    pub async fn resend_offline(&self) -> Result<u64, StoreError> {
        let ids = self.queue.queued_ids().await?;
        if !ids.is_empty() {
            info!("Resending {} queued tasks", ids.len());
        }

        let mut resent = 0;
        for task_id in ids {
            let Some(task) = self.queue.load(&task_id).await.or_log_default("Failed to load task")
            else {
                warn!("Queued task {} has no readable record", task_id);
                continue;
            };

            if !task.result.is_empty() {
                info!("Queued task {} already has a result, removing", task_id);
                if let Err(e) = self.queue.take_queued(&task_id).await {
                    error!("Failed to remove finished task {}: {}", task_id, e);
                }
                continue;
            }

            self.notifier.publish(task.publish_topic(), task.encode());
            resent += 1;
        }
        Ok(resent)
    }

    async fn lease_for(&self, role: WorkerRole, task_id: &str) -> Duration {
        match role {
            WorkerRole::Manager => self.settings.manager_lease(),
            WorkerRole::Probe => {
                let timeout = self
                    .queue
                    .load(task_id)
                    .await
                    .or_log_default("Failed to load task")
                    .map(|task| task.timeout_seconds)
                    .unwrap_or(0);
                if timeout == 0 {
                    self.settings.probe_lease()
                } else {
                    Duration::from_secs(timeout)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_service_test.rs"]
mod tests;
