// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::kv_store::KvStore;
use crate::queue::keys;
use crate::utils::errors::LogFallback;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// 创建者服务
///
/// 把外部身份（`X-Forwarded-User`）映射为内部创建者ID，首次出现时自动分配
#[derive(Clone)]
pub struct CreatorService {
    store: Arc<dyn KvStore>,
}

impl CreatorService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// 查找或分配创建者ID
    ///
    /// # 参数
    ///
    /// * `external_id` - 外部身份，可以为空
    ///
    /// # 返回值
    ///
    /// 返回内部创建者ID
    pub async fn resolve(&self, external_id: &str) -> String {
        let key = keys::user_uuid(external_id);
        if let Some(existing) = self
            .store
            .get(&key)
            .await
            .or_log_default("Failed to read creator mapping")
            .filter(|id| !id.is_empty())
        {
            return existing;
        }

        let creator_id = Uuid::new_v4().to_string();
        if let Err(e) = self.store.set(&key, &creator_id, None).await {
            error!("Failed to persist creator mapping for {}: {}", external_id, e);
        } else {
            info!("Assigned creator {} to {}", creator_id, external_id);
        }
        creator_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::memory_store::InMemoryKvStore;

    #[tokio::test]
    async fn test_resolve_is_stable() {
        let service = CreatorService::new(Arc::new(InMemoryKvStore::new()));

        let first = service.resolve("alice@example.com").await;
        let second = service.resolve("alice@example.com").await;
        let other = service.resolve("bob@example.com").await;

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.len(), 36);
    }
}
