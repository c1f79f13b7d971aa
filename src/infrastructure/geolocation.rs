// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// 公共任务主题，总是追加在订阅频道末尾
const TASKS_CHANNEL: &str = "tasks";

/// IP地理位置信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoLocation {
    /// 城市
    pub city: String,
    /// 国家名称
    pub country: String,
    /// 国家代码
    pub country_code: String,
    /// 自治系统号，0表示未知
    pub asn: u64,
    /// 自治系统运营方
    pub provider: String,
}

impl GeoLocation {
    /// 转换为订阅频道列表（不含公共任务主题）
    pub fn channels(&self) -> Vec<String> {
        let mut channels = Vec::new();
        if !self.city.is_empty() {
            channels.push(format!("City:{}", self.city));
        }
        if !self.country.is_empty() {
            channels.push(format!("Country:{}", self.country));
        }
        if self.asn != 0 {
            channels.push(format!("ASN:{}", self.asn));
        }
        channels
    }
}

/// IP地理定位服务
pub struct GeoLocationService {
    /// API端点
    api_endpoint: String,
    /// HTTP客户端
    client: reqwest::Client,
}

impl GeoLocationService {
    /// 使用指定API端点创建服务实例
    ///
    /// # 参数
    ///
    /// * `api_endpoint` - 地理查询服务地址
    /// * `timeout` - 请求超时
    pub fn new(api_endpoint: String, timeout: Duration) -> Self {
        Self {
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// 获取IP地址的地理位置信息
    ///
    /// # 参数
    ///
    /// * `ip` - IP地址
    ///
    /// # 返回值
    ///
    /// * `Ok(GeoLocation)` - 地理位置信息
    /// * `Err(anyhow::Error)` - 获取失败
    pub async fn get_location(&self, ip: &str) -> Result<GeoLocation> {
        debug!("Getting geolocation for IP: {}", ip);

        let url = format!("{}/", self.api_endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("ip", ip)])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch geolocation for IP {}: {}", ip, e);
                anyhow::anyhow!("Failed to fetch geolocation: {}", e)
            })?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Geolocation API error: {}",
                response.status()
            ));
        }

        let location: GeoLocation = response.json().await.map_err(|e| {
            error!("Failed to parse geolocation response for IP {}: {}", ip, e);
            anyhow::anyhow!("Failed to parse geolocation response: {}", e)
        })?;

        debug!("Geolocation for IP {}: {:?}", ip, location);
        Ok(location)
    }

    /// 计算探针的订阅频道
    ///
    /// 查询失败时只返回公共任务主题
    pub async fn channels_for_ip(&self, ip: &str) -> Vec<String> {
        let mut channels = match self.get_location(ip).await {
            Ok(location) => location.channels(),
            Err(e) => {
                warn!("Geolocation lookup failed for {}: {}", ip, e);
                Vec::new()
            }
        };
        channels.push(TASKS_CHANNEL.to_string());
        channels
    }
}
