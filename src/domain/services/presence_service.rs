// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DispatchSettings;
use crate::domain::models::task::Task;
use crate::domain::models::worker::{Worker, WorkerRole};
use crate::domain::repositories::kv_store::{KvStore, StoreError};
use crate::domain::services::creator_service::CreatorService;
use crate::domain::services::destination_resolver::DestinationResolver;
use crate::domain::services::notification_service::NotificationService;
use crate::queue::keys;
use crate::utils::errors::LogFallback;
use crate::utils::pagination::Page;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 订阅时最多读取的频道头数量
pub const MAX_CHANNEL_HEADERS: usize = 5;

/// 在线状态错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresenceError {
    #[error("{0} is not registered")]
    NotRegistered(String),
}

/// 在线状态服务
///
/// 管理执行者的注册、订阅/退订、心跳挑战与驱逐
#[derive(Clone)]
pub struct PresenceService {
    store: Arc<dyn KvStore>,
    creators: CreatorService,
    resolver: DestinationResolver,
    notifier: Arc<dyn NotificationService>,
    settings: DispatchSettings,
}

impl PresenceService {
    pub fn new(
        store: Arc<dyn KvStore>,
        notifier: Arc<dyn NotificationService>,
        resolver: DestinationResolver,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            creators: CreatorService::new(store.clone()),
            store,
            resolver,
            notifier,
            settings,
        }
    }

    /// 注册执行者
    ///
    /// # 参数
    ///
    /// * `role` - 执行者角色
    /// * `name` - 名称，为空时使用ID
    /// * `external_user` - 调用方外部身份
    ///
    /// # 返回值
    ///
    /// 返回新注册的执行者
    pub async fn register(&self, role: WorkerRole, name: &str, external_user: &str) -> Worker {
        let creator_id = self.creators.resolve(external_user).await;
        let worker = Worker::new(name, &creator_id, Utc::now().timestamp());

        if let Err(e) = self
            .store
            .set(&keys::worker_record(role, &worker.id), &worker.encode(), None)
            .await
        {
            error!("Failed to persist {} {}: {}", role, worker.id, e);
        }
        if let Err(e) = self.store.set_add(keys::registry(role), &worker.id).await {
            error!("Failed to register {} {}: {}", role, worker.id, e);
        }
        if let Err(e) = self
            .store
            .set_add(&keys::user_workers(role, &creator_id), &worker.id)
            .await
        {
            error!("Failed to index {} {}: {}", role, worker.id, e);
        }

        info!("{} created {}", role, worker.id);
        worker
    }

    /// 是否为已注册的执行者
    pub async fn is_registered(&self, role: WorkerRole, worker_id: &str) -> bool {
        self.store
            .set_is_member(keys::registry(role), worker_id)
            .await
            .or_log_default("Failed to check registry")
    }

    /// 执行者上线
    ///
    /// # 参数
    ///
    /// * `role` - 执行者角色
    /// * `worker_id` - 执行者ID
    /// * `channels` - 探针订阅的频道（`City:..`、`Country:..`、`ASN:..`），只读取前5个
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 已上线
    /// * `Err(PresenceError::NotRegistered)` - 执行者未注册
    pub async fn subscribe(
        &self,
        role: WorkerRole,
        worker_id: &str,
        channels: &[String],
    ) -> Result<(), PresenceError> {
        if !self.is_registered(role, worker_id).await {
            warn!("{} {} is not registered, rejecting subscription", role, worker_id);
            return Err(PresenceError::NotRegistered(worker_id.to_string()));
        }

        if let Err(e) = self.store.set_add(keys::online(role), worker_id).await {
            error!("Failed to mark {} online: {}", worker_id, e);
        }

        if role == WorkerRole::Probe {
            for channel in channels.iter().take(MAX_CHANNEL_HEADERS) {
                let Some((hash, value)) = classify_channel(channel) else {
                    continue;
                };
                if let Err(e) = self.store.hash_set(hash, worker_id, value).await {
                    error!("Failed to tag {} with {}: {}", worker_id, channel, e);
                }
            }
        }

        let online = self
            .store
            .set_cardinality(keys::online(role))
            .await
            .or_log_default("Failed to count online workers");
        info!("{} {} connected, {} online", role, worker_id, online);

        self.resolver.publish_active_destinations().await;
        Ok(())
    }

    /// 执行者下线
    pub async fn unsubscribe(&self, role: WorkerRole, worker_id: &str) {
        self.take_offline(role, worker_id).await;
        info!("{} {} disconnected", role, worker_id);
        self.resolver.publish_active_destinations().await;
    }

    /// 应答心跳挑战
    ///
    /// # 返回值
    ///
    /// 挑战匹配并已清除时返回true
    pub async fn pong(&self, worker_id: &str, challenge: &str) -> bool {
        let key = keys::alive(worker_id);
        let pending = self
            .store
            .get(&key)
            .await
            .or_log_default("Failed to read challenge");

        match pending {
            Some(expected) if !challenge.is_empty() && expected == challenge => {
                if let Err(e) = self.store.del(&key).await {
                    error!("Failed to clear challenge of {}: {}", worker_id, e);
                }
                true
            }
            _ => {
                debug!("Unexpected pong from {}", worker_id);
                false
            }
        }
    }

    /// 心跳扫描
    ///
    /// 对每个在线执行者：没有未应答挑战时下发新挑战；
    /// 上一轮挑战仍未应答时将其驱逐。因此驱逐发生在连续第二次未应答时。
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 本轮驱逐的数量
    /// * `Err(StoreError)` - 无法列出在线集合
    pub async fn check_alive(&self, role: WorkerRole) -> Result<u64, StoreError> {
        let online = self.store.set_members(keys::online(role)).await?;

        let mut evicted = 0;
        for worker_id in online {
            let pending = self
                .store
                .get(&keys::alive(&worker_id))
                .await
                .or_log_default("Failed to read challenge");

            if pending.as_deref().map_or(true, str::is_empty) {
                self.challenge(role, &worker_id).await;
                continue;
            }

            info!("{} {} removed", role, worker_id);
            self.take_offline(role, &worker_id).await;
            self.notifier
                .unpublish(&keys::dedicated_topic(role, &worker_id));
            self.resolver.publish_active_destinations().await;
            metrics::counter!("workers_evicted_total").increment(1);
            evicted += 1;
        }

        Ok(evicted)
    }

    /// 在线执行者ID
    pub async fn online(&self, role: WorkerRole) -> Vec<String> {
        let mut ids = self
            .store
            .set_members(keys::online(role))
            .await
            .or_log_default("Failed to list online workers");
        ids.sort();
        ids
    }

    /// 分页列出调用方注册的执行者
    pub async fn list_user_workers(
        &self,
        role: WorkerRole,
        external_user: &str,
        page: u64,
    ) -> Page<Worker> {
        let creator_id = self.creators.resolve(external_user).await;
        let mut ids = self
            .store
            .set_members(&keys::user_workers(role, &creator_id))
            .await
            .or_log_default("Failed to list user workers");
        ids.sort();

        let (page, window) = Page::slice(&ids, page, self.settings.page_size);
        let record_keys: Vec<String> = window
            .iter()
            .map(|id| keys::worker_record(role, id))
            .collect();
        let workers: Vec<Worker> = self
            .store
            .multi_get(&record_keys)
            .await
            .or_log_default("Failed to load workers")
            .into_iter()
            .flatten()
            .filter_map(|raw| Worker::decode(&raw).ok())
            .collect();

        page.with_results(workers)
    }

    async fn challenge(&self, role: WorkerRole, worker_id: &str) {
        let challenge = Uuid::new_v4().to_string();
        if let Err(e) = self
            .store
            .set(
                &keys::alive(worker_id),
                &challenge,
                Some(self.settings.alive_ttl()),
            )
            .await
        {
            error!("Failed to store challenge for {}: {}", worker_id, e);
            return;
        }

        let message = Task {
            id: challenge,
            action: "alive".to_string(),
            created_at: Utc::now().timestamp(),
            ..Default::default()
        };
        self.notifier
            .publish(&keys::dedicated_topic(role, worker_id), message.encode());
    }

    async fn take_offline(&self, role: WorkerRole, worker_id: &str) {
        if let Err(e) = self.store.set_remove(keys::online(role), worker_id).await {
            error!("Failed to mark {} offline: {}", worker_id, e);
        }
        if role == WorkerRole::Probe {
            for hash in keys::TAG_HASHES {
                if let Err(e) = self.store.hash_delete(hash, worker_id).await {
                    error!("Failed to clear {} of {}: {}", hash, worker_id, e);
                }
            }
        }
    }
}

/// 按前缀识别频道，返回目标哈希和第一个 `:` 之后的取值
fn classify_channel(channel: &str) -> Option<(&'static str, &str)> {
    let hash = if channel.starts_with("City") {
        keys::CITY_TAGS
    } else if channel.starts_with("Country") {
        keys::COUNTRY_TAGS
    } else if channel.starts_with("ASN") {
        keys::ASN_TAGS
    } else {
        return None;
    };
    let (_, value) = channel.split_once(':')?;
    Some((hash, value))
}

#[cfg(test)]
#[path = "presence_service_test.rs"]
mod tests;
