// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::Task;
use crate::domain::models::worker::WorkerRole;
use crate::domain::repositories::kv_store::{KvStore, StoreError};
use crate::queue::keys;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// 任务队列
///
/// 在键值存储之上提供带类型的队列原语：任务记录、待领取集合、
/// 处理中集合、租约、忙碌标记和完成审计。所有操作都是单条命令，
/// 组合逻辑由调用方（领取/上报状态机）负责。
#[derive(Clone)]
pub struct TaskQueue {
    store: Arc<dyn KvStore>,
}

impl TaskQueue {
    /// 创建新的任务队列实例
    ///
    /// # 参数
    ///
    /// * `store` - 键值存储
    ///
    /// # 返回值
    ///
    /// 返回新的任务队列实例
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// 读取任务记录
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(Task))` - 记录存在且可解码
    /// * `Ok(None)` - 记录不存在或无法解码（解码错误会记录日志）
    /// * `Err(StoreError)` - 存储读取失败
    pub async fn load(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let raw = match self.store.get(&keys::task(task_id)).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        match Task::decode(&raw) {
            Ok(task) => Ok(Some(task)),
            Err(e) => {
                warn!("Failed to decode task {}: {}", task_id, e);
                Ok(None)
            }
        }
    }

    /// 持久化任务记录
    pub async fn save(&self, task: &Task) -> Result<(), StoreError> {
        self.store.set(&keys::task(&task.id), &task.encode(), None).await
    }

    /// 放入待领取集合
    pub async fn enqueue(&self, task_id: &str) -> Result<(), StoreError> {
        self.store.set_add(keys::QUEUED, task_id).await
    }

    /// 从待领取集合原子取出
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 本次调用取得了该任务
    /// * `Ok(false)` - 任务不在集合中或已被其他调用方取走
    pub async fn take_queued(&self, task_id: &str) -> Result<bool, StoreError> {
        Ok(self.store.set_remove(keys::QUEUED, task_id).await? > 0)
    }

    pub async fn queued_ids(&self) -> Result<Vec<String>, StoreError> {
        self.store.set_members(keys::QUEUED).await
    }

    /// 记录处理中条目并写入租约
    pub async fn begin_processing(
        &self,
        worker_id: &str,
        task_id: &str,
        lease: Duration,
    ) -> Result<(), StoreError> {
        self.store
            .set_add(keys::PROCESSING, &keys::processing_pair(worker_id, task_id))
            .await?;
        self.store
            .set(
                &keys::lease(worker_id, task_id),
                keys::LEASE_MARKER,
                Some(lease),
            )
            .await
    }

    pub async fn is_processing(&self, worker_id: &str, task_id: &str) -> Result<bool, StoreError> {
        self.store
            .set_is_member(keys::PROCESSING, &keys::processing_pair(worker_id, task_id))
            .await
    }

    /// 原子移除处理中条目，返回本次调用是否真正移除
    pub async fn finish_processing(&self, worker_id: &str, task_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .store
            .set_remove(keys::PROCESSING, &keys::processing_pair(worker_id, task_id))
            .await?
            > 0)
    }

    pub async fn processing_pairs(&self) -> Result<Vec<String>, StoreError> {
        self.store.set_members(keys::PROCESSING).await
    }

    /// 租约是否仍然有效
    pub async fn lease_is_valid(&self, worker_id: &str, task_id: &str) -> Result<bool, StoreError> {
        let value = self.store.get(&keys::lease(worker_id, task_id)).await?;
        Ok(value.as_deref() == Some(keys::LEASE_MARKER))
    }

    pub async fn record_done(
        &self,
        worker_id: &str,
        task_id: &str,
        result: &str,
    ) -> Result<(), StoreError> {
        self.store
            .set_add(keys::DONE, &keys::done_entry(worker_id, task_id, result))
            .await
    }

    /// 执行者是否处于忙碌状态，不受限制的角色始终返回false
    pub async fn is_busy(&self, role: WorkerRole, worker_id: &str) -> Result<bool, StoreError> {
        match keys::busy(role) {
            Some(key) => self.store.set_is_member(key, worker_id).await,
            None => Ok(false),
        }
    }

    pub async fn mark_busy(&self, role: WorkerRole, worker_id: &str) -> Result<(), StoreError> {
        match keys::busy(role) {
            Some(key) => self.store.set_add(key, worker_id).await,
            None => Ok(()),
        }
    }

    pub async fn clear_busy(&self, role: WorkerRole, worker_id: &str) -> Result<(), StoreError> {
        match keys::busy(role) {
            Some(key) => self.store.set_remove(key, worker_id).await.map(|_| ()),
            None => Ok(()),
        }
    }

    /// 加入创建者的任务索引
    pub async fn index_for_creator(&self, creator_id: &str, task_id: &str) -> Result<(), StoreError> {
        self.store.set_add(&keys::user_tasks(creator_id), task_id).await
    }
}
