// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 内存存储的连接URL
pub const MEMORY_STORE_URL: &str = "memory://";

/// 应用程序配置设置
///
/// 包含服务器、存储、通知、地理查询、调度和后台扫描等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 发布订阅通知配置
    pub notification: NotificationSettings,
    /// 地理查询配置
    pub geo: GeoSettings,
    /// 调度配置
    pub dispatch: DispatchSettings,
    /// 后台扫描配置
    pub sweeps: SweepSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 对外域名，追加到匿名订阅的频道列表末尾
    pub fqdn: Option<String>,
}

/// Redis配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL，`memory://` 表示使用进程内存储
    pub url: String,
}

impl RedisSettings {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_STORE_URL
    }
}

/// 通知配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    /// 发布订阅端点基础地址
    pub base_url: String,
    /// 待投递队列容量
    pub queue_capacity: usize,
    /// 同时进行的最大投递数
    pub max_in_flight: usize,
    /// 单次投递超时（秒），不设置则不限时
    pub timeout_seconds: Option<u64>,
}

/// 地理查询配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct GeoSettings {
    pub url: String,
    pub timeout_seconds: u64,
}

/// 调度配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchSettings {
    /// 探针租约默认时长（秒），任务未指定超时时使用
    pub probe_lease_seconds: u64,
    /// 管理器租约时长（秒）
    pub manager_lease_seconds: u64,
    /// 心跳挑战有效期（秒）
    pub alive_ttl_seconds: u64,
    /// 启动时补发周期任务的回溯小时数
    pub history_hours: i64,
    /// 列表每页条数
    pub page_size: u64,
}

impl DispatchSettings {
    pub fn probe_lease(&self) -> Duration {
        Duration::from_secs(self.probe_lease_seconds)
    }

    pub fn manager_lease(&self) -> Duration {
        Duration::from_secs(self.manager_lease_seconds)
    }

    pub fn alive_ttl(&self) -> Duration {
        Duration::from_secs(self.alive_ttl_seconds)
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            probe_lease_seconds: 60,
            manager_lease_seconds: 300,
            alive_ttl_seconds: 90,
            history_hours: 6,
            page_size: 20,
        }
    }
}

/// 后台扫描间隔配置（秒）
#[derive(Debug, Clone, Deserialize)]
pub struct SweepSettings {
    pub processing_interval_seconds: u64,
    pub liveness_interval_seconds: u64,
    pub repeatable_interval_seconds: u64,
    pub destinations_interval_seconds: u64,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 按默认值、`config/default`、`config/{APP_ENVIRONMENT}`、
    /// `ZONDCC__` 前缀环境变量的顺序叠加
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("ZONDCC").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅包含默认值的配置构建器
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9000)?
            // Store
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            // Pub/sub endpoint
            .set_default("notification.base_url", "http://127.0.0.1:80")?
            .set_default("notification.queue_capacity", 1024)?
            .set_default("notification.max_in_flight", 32)?
            // Geo lookup
            .set_default("geo.url", "http://127.0.0.1:9001")?
            .set_default("geo.timeout_seconds", 5)?
            // Dispatch
            .set_default("dispatch.probe_lease_seconds", 60)?
            .set_default("dispatch.manager_lease_seconds", 300)?
            .set_default("dispatch.alive_ttl_seconds", 90)?
            .set_default("dispatch.history_hours", 6)?
            .set_default("dispatch.page_size", 20)?
            // Sweeps
            .set_default("sweeps.processing_interval_seconds", 60)?
            .set_default("sweeps.liveness_interval_seconds", 60)?
            .set_default("sweeps.repeatable_interval_seconds", 60)?
            .set_default("sweeps.destinations_interval_seconds", 120)?
            // Metrics
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen", "0.0.0.0:9100")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
