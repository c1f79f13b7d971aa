// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 在线目的地快照
///
/// 由在线探针及其地理标签聚合而成，发布到 `destinations` 主题
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Destinations {
    pub action: String,
    pub zonds: Vec<String>,
    pub countries: Vec<String>,
    pub cities: Vec<String>,
    pub asns: Vec<String>,
}

impl Destinations {
    pub fn new(
        zonds: Vec<String>,
        countries: Vec<String>,
        cities: Vec<String>,
        asns: Vec<String>,
    ) -> Self {
        Self {
            action: "destinations".to_string(),
            zonds,
            countries,
            cities,
            asns,
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// 调用方提交的路由提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationHint {
    /// 指定单个探针
    Zond(String),
    City(String),
    Country(String),
    Asn(String),
    /// 不限定，发往公共任务主题
    Any,
}

impl DestinationHint {
    /// 解析 `zond:<kind>:<value>` 形式的提示
    ///
    /// 只有长度大于4且恰好包含两个 `:` 的提示才会被识别，其余一律视为 `Any`
    pub fn parse(raw: &str) -> Self {
        if raw.len() <= 4 || raw.matches(':').count() != 2 {
            return DestinationHint::Any;
        }

        let mut parts = raw.splitn(3, ':');
        let (_, kind, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(kind), Some(value)) => (prefix, kind, value),
            _ => return DestinationHint::Any,
        };

        match kind {
            "uuid" => DestinationHint::Zond(value.to_string()),
            "city" => DestinationHint::City(value.to_string()),
            "country" => DestinationHint::Country(value.to_string()),
            "asn" => DestinationHint::Asn(value.to_string()),
            _ => DestinationHint::Any,
        }
    }
}
