// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::Task;
use crate::domain::repositories::kv_store::{KvStore, StoreError};
use crate::queue::keys;
use std::sync::Arc;

const SCAN_BATCH: usize = 100;

/// 重复任务调度器
///
/// 周期任务以完整快照的形式存放在按5分钟对齐的时间桶集合中，
/// 每个桶到期时由再生扫描取出并生成新实例。
#[derive(Clone)]
pub struct RepeatScheduler {
    store: Arc<dyn KvStore>,
}

impl RepeatScheduler {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// 将任务快照排入下一次执行的时间桶
    ///
    /// # 参数
    ///
    /// * `task` - 任务快照
    /// * `now` - 当前unix时间戳
    ///
    /// # 返回值
    ///
    /// * `Ok(i64)` - 快照所在时间桶
    /// * `Err(StoreError)` - 写入失败
    pub async fn schedule(&self, task: &Task, now: i64) -> Result<i64, StoreError> {
        let bucket = task.repeat.next_bucket(now);
        self.store
            .set_add(&keys::repeatable_bucket(bucket), &task.encode())
            .await?;
        Ok(bucket)
    }

    /// 完整遍历一个时间桶中的快照
    pub async fn snapshots(&self, bucket: i64) -> Result<Vec<String>, StoreError> {
        self.scan_all(&keys::repeatable_bucket(bucket)).await
    }

    /// 从时间桶中移除快照
    pub async fn remove_snapshot(&self, bucket_key: &str, raw: &str) -> Result<u64, StoreError> {
        self.store.set_remove(bucket_key, raw).await
    }

    /// 所有现存的时间桶键
    pub async fn bucket_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut found = self.store.keys(&keys::repeatable_pattern()).await?;
        found.sort();
        Ok(found)
    }

    /// 使用游标遍历集合直到游标归零
    pub async fn scan_all(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut members = Vec::new();
        let mut cursor = 0;
        loop {
            let (batch, next) = self.store.set_scan(key, cursor, SCAN_BATCH).await?;
            members.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(members)
    }
}
