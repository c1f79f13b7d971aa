// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::destination::{DestinationHint, Destinations};
use crate::domain::models::task::UNRESTRICTED_TOPIC;
use crate::domain::models::worker::WorkerRole;
use crate::domain::repositories::kv_store::KvStore;
use crate::domain::services::notification_service::NotificationService;
use crate::queue::keys;
use crate::utils::errors::LogFallback;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// 目的地解析器
///
/// 把调用方的路由提示解析为发布主题，并汇总当前在线的目的地
#[derive(Clone)]
pub struct DestinationResolver {
    store: Arc<dyn KvStore>,
    notifier: Arc<dyn NotificationService>,
}

impl DestinationResolver {
    pub fn new(store: Arc<dyn KvStore>, notifier: Arc<dyn NotificationService>) -> Self {
        Self { store, notifier }
    }

    /// 解析路由提示
    ///
    /// 指定探针时只有该探针在线才会定向，否则静默回落到公共任务主题；
    /// 城市/国家/ASN提示不检查可用性
    ///
    /// # 参数
    ///
    /// * `hint` - 原始提示，如 `zond:city:Berlin`
    ///
    /// # 返回值
    ///
    /// 返回发布主题
    pub async fn resolve(&self, hint: &str) -> String {
        match DestinationHint::parse(hint) {
            DestinationHint::Zond(id) => {
                let online = self
                    .store
                    .set_is_member(keys::online(WorkerRole::Probe), &id)
                    .await
                    .or_log_default("Failed to check probe presence");
                if online {
                    keys::dedicated_topic(WorkerRole::Probe, &id)
                } else {
                    debug!("Probe {} is offline, falling back to {}", id, UNRESTRICTED_TOPIC);
                    UNRESTRICTED_TOPIC.to_string()
                }
            }
            DestinationHint::City(city) => format!("City:{}", city),
            DestinationHint::Country(country) => format!("Country:{}", country),
            DestinationHint::Asn(asn) => format!("ASN:{}", asn),
            DestinationHint::Any => UNRESTRICTED_TOPIC.to_string(),
        }
    }

    /// 汇总在线目的地
    pub async fn active_destinations(&self) -> Destinations {
        let mut zonds = self
            .store
            .set_members(keys::online(WorkerRole::Probe))
            .await
            .or_log_default("Failed to list online probes");
        zonds.sort();

        let (countries, cities, asns) = futures::join!(
            self.unique_values(keys::COUNTRY_TAGS),
            self.unique_values(keys::CITY_TAGS),
            self.unique_values(keys::ASN_TAGS),
        );
        Destinations::new(zonds, countries, cities, asns)
    }

    /// 重新计算并发布在线目的地快照
    pub async fn publish_active_destinations(&self) -> Destinations {
        let snapshot = self.active_destinations().await;
        self.notifier
            .publish(keys::DESTINATIONS_TOPIC, snapshot.encode());
        snapshot
    }

    async fn unique_values(&self, hash: &str) -> Vec<String> {
        let values = self
            .store
            .hash_values(hash)
            .await
            .or_log_default("Failed to read destination tags");
        values
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
