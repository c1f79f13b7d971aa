// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DispatchSettings;
use crate::domain::models::task::{
    MainType, RepeatInterval, Task, TaskKind, TaskValidationError,
};
use crate::domain::repositories::kv_store::KvStore;
use crate::domain::services::creator_service::CreatorService;
use crate::domain::services::destination_resolver::DestinationResolver;
use crate::domain::services::notification_service::NotificationService;
use crate::queue::keys;
use crate::queue::scheduler::RepeatScheduler;
use crate::queue::task_queue::TaskQueue;
use crate::utils::errors::LogFallback;
use crate::utils::pagination::Page;
use crate::utils::validators::looks_like_uuid;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 任务创建草稿
///
/// 调用方提交的原始字段，尚未校验
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub kind: String,
    pub param: String,
    pub repeat: String,
    pub dest: String,
    pub main_type: String,
    pub count: String,
}

/// 任务服务
///
/// 负责任务创建、创建者任务列表以及周期任务快照的查看与删除
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn KvStore>,
    queue: TaskQueue,
    scheduler: RepeatScheduler,
    creators: CreatorService,
    resolver: DestinationResolver,
    notifier: Arc<dyn NotificationService>,
    settings: DispatchSettings,
}

impl TaskService {
    pub fn new(
        store: Arc<dyn KvStore>,
        notifier: Arc<dyn NotificationService>,
        resolver: DestinationResolver,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            queue: TaskQueue::new(store.clone()),
            scheduler: RepeatScheduler::new(store.clone()),
            creators: CreatorService::new(store.clone()),
            store,
            resolver,
            notifier,
            settings,
        }
    }

    /// 创建任务
    ///
    /// # 参数
    ///
    /// * `draft` - 调用方提交的字段
    /// * `external_user` - 调用方外部身份
    ///
    /// # 返回值
    ///
    /// * `Ok(Task)` - 已入队并发布的任务
    /// * `Err(TaskValidationError)` - 校验失败，没有任何副作用
    pub async fn create(
        &self,
        draft: &TaskDraft,
        external_user: &str,
    ) -> Result<Task, TaskValidationError> {
        self.create_at(draft, external_user, Utc::now().timestamp())
            .await
    }

    /// 以指定时间创建任务
    pub async fn create_at(
        &self,
        draft: &TaskDraft,
        external_user: &str,
        now: i64,
    ) -> Result<Task, TaskValidationError> {
        let (kind, param) = validate(draft)?;

        let mut task = Task::new(kind, param, now);
        task.repeat = RepeatInterval::parse(&draft.repeat);
        task.main_type = MainType::from(draft.main_type.clone());
        task.count = draft.count.trim().parse().unwrap_or(1);
        task.timeout_seconds = self.settings.probe_lease_seconds;
        task.target = self.resolver.resolve(&draft.dest).await;
        task.creator_id = self.creators.resolve(external_user).await;

        if let Err(e) = self.queue.save(&task).await {
            error!("Failed to persist task {}: {}", task.id, e);
        }
        if let Err(e) = self.queue.enqueue(&task.id).await {
            error!("Failed to enqueue task {}: {}", task.id, e);
        }
        if let Err(e) = self.queue.index_for_creator(&task.creator_id, &task.id).await {
            error!("Failed to index task {}: {}", task.id, e);
        }
        if task.repeat.is_repeating() {
            match self.scheduler.schedule(&task, now).await {
                Ok(bucket) => info!("Task {} next start will be at {}", task.id, bucket),
                Err(e) => error!("Failed to schedule repeatable task {}: {}", task.id, e),
            }
        }

        self.notifier.publish(task.publish_topic(), task.encode());
        metrics::counter!("tasks_created_total").increment(1);
        info!("Task created {} {} {}", task.action, task.param, task.id);

        Ok(task)
    }

    /// 分页列出创建者的任务
    ///
    /// # 参数
    ///
    /// * `external_user` - 调用方外部身份
    /// * `page` - 页码
    pub async fn list_user_tasks(&self, external_user: &str, page: u64) -> Page<Task> {
        let creator_id = self.creators.resolve(external_user).await;
        let mut ids = self
            .store
            .set_members(&keys::user_tasks(&creator_id))
            .await
            .or_log_default("Failed to list user tasks");
        ids.sort();

        let (page, window) = Page::slice(&ids, page, self.settings.page_size);
        let record_keys: Vec<String> = window.iter().map(|id| keys::task(id)).collect();
        let records = self
            .store
            .multi_get(&record_keys)
            .await
            .or_log_default("Failed to load user tasks");

        let tasks: Vec<Task> = records
            .into_iter()
            .flatten()
            .filter_map(|raw| match Task::decode(&raw) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!("Skipping undecodable task record: {}", e);
                    None
                }
            })
            .collect();

        page.with_results(tasks)
    }

    /// 列出全部时间桶中的周期任务快照
    pub async fn list_repeatable(&self) -> Vec<Task> {
        let buckets = self
            .scheduler
            .bucket_keys()
            .await
            .or_log_default("Failed to list repeatable buckets");

        let mut tasks = Vec::new();
        for bucket in buckets {
            let snapshots = self
                .scheduler
                .scan_all(&bucket)
                .await
                .or_log_default("Failed to scan repeatable bucket");
            for raw in snapshots {
                match Task::decode(&raw) {
                    Ok(task) => tasks.push(task),
                    Err(e) => warn!("Undecodable snapshot in {}: {}", bucket, e),
                }
            }
        }
        tasks
    }

    /// 从所有时间桶中删除指定ID的周期任务快照
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 删除的快照数量
    /// * `Err(TaskValidationError::InvalidUuid)` - ID形式不合法
    pub async fn remove_repeatable(&self, task_id: &str) -> Result<u64, TaskValidationError> {
        if !looks_like_uuid(task_id) {
            return Err(TaskValidationError::InvalidUuid);
        }

        let buckets = self
            .scheduler
            .bucket_keys()
            .await
            .or_log_default("Failed to list repeatable buckets");

        let mut removed = 0;
        for bucket in buckets {
            let snapshots = self
                .scheduler
                .scan_all(&bucket)
                .await
                .or_log_default("Failed to scan repeatable bucket");
            for raw in snapshots {
                let matches = Task::decode(&raw)
                    .map(|task| task.id == task_id)
                    .unwrap_or(false);
                if matches {
                    removed += self
                        .scheduler
                        .remove_snapshot(&bucket, &raw)
                        .await
                        .or_log_default("Failed to remove repeatable snapshot");
                }
            }
        }

        info!("Removed {} repeatable snapshots of {}", removed, task_id);
        Ok(removed)
    }
}

/// 按顺序校验草稿，遇到第一个错误即返回
fn validate(draft: &TaskDraft) -> Result<(TaskKind, String), TaskValidationError> {
    if draft.param.is_empty() {
        return Err(TaskValidationError::MissingParam);
    }
    let kind: TaskKind = draft.kind.parse()?;
    let param = kind.normalize_param(&draft.param)?;
    Ok((kind, param))
}

#[cfg(test)]
#[path = "task_service_test.rs"]
mod tests;
