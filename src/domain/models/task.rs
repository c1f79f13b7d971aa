// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::worker::WorkerRole;
use crate::utils::validators::is_ip_or_hostname;

/// 重复任务时间桶的宽度（秒）
pub const BUCKET_SECONDS: i64 = 300;

/// DNS任务未指定解析器时使用的默认解析器
pub const DEFAULT_RESOLVER: &str = "8.8.8.8";

/// 管理器任务的发布主题
pub const MANAGER_TOPIC: &str = "mngrtasks";

/// 不限定探针的默认发布主题
pub const UNRESTRICTED_TOPIC: &str = "tasks";

/// 将时间戳向下取整到5分钟时间桶
pub fn floor_to_bucket(timestamp: i64) -> i64 {
    timestamp - timestamp.rem_euclid(BUCKET_SECONDS)
}

/// 任务实体
///
/// 表示系统中一个可调度的工作单元。同一结构也用于探针/管理器上报的
/// 协议消息（`block`、`result`、`alive`），因此所有字段都带默认值，
/// 编码时总是输出完整字段集合，保证读-改-写不会丢失字段。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    /// 任务唯一标识符
    #[serde(rename = "uuid")]
    pub id: String,
    /// 周期任务链的起始任务ID
    #[serde(rename = "parent")]
    pub parent_id: String,
    /// 任务类型（ping/head/dns/traceroute）或协议动作
    pub action: String,
    /// 规范化后的目标参数
    pub param: String,
    /// 主类型，决定路由到探针还是管理器
    #[serde(rename = "type")]
    pub main_type: MainType,
    /// 期望的执行次数
    pub count: i64,
    /// 领取后的租约时长（秒）
    #[serde(rename = "timeout")]
    pub timeout_seconds: u64,
    /// 创建者ID
    #[serde(rename = "creator")]
    pub creator_id: String,
    /// 解析后的发布主题
    pub target: String,
    /// 重复周期
    pub repeat: RepeatInterval,
    /// 创建时间（unix秒）
    #[serde(rename = "created")]
    pub created_at: i64,
    /// 更新时间（unix秒）
    #[serde(rename = "updated")]
    pub updated_at: i64,
    /// 领取任务的探针ID
    #[serde(rename = "zond")]
    pub zond_id: String,
    /// 领取任务的管理器ID
    #[serde(rename = "mngr")]
    pub mngr_id: String,
    /// 执行结果
    pub result: String,
}

impl Task {
    /// 创建一个新的任务
    ///
    /// # 参数
    ///
    /// * `kind` - 任务类型
    /// * `param` - 已规范化的目标参数
    /// * `now` - 当前unix时间戳
    ///
    /// # 返回值
    ///
    /// 返回新创建的任务实例，`parent_id` 指向自身
    pub fn new(kind: TaskKind, param: String, now: i64) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            parent_id: id.clone(),
            id,
            action: kind.to_string(),
            param,
            count: 1,
            target: UNRESTRICTED_TOPIC.to_string(),
            created_at: now,
            ..Default::default()
        }
    }

    /// 解码存储中的JSON文档
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// 编码为完整字段集合的JSON文档
    pub fn encode(&self) -> String {
        // Every field is a plain string/number/enum label, serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// 任务应当发布到的主题
    ///
    /// 测量类任务统一发往管理器主题，其余发往解析得到的目标
    pub fn publish_topic(&self) -> &str {
        match self.main_type {
            MainType::Task => &self.target,
            MainType::Measurement => MANAGER_TOPIC,
        }
    }

    /// 按角色读取领取者ID
    pub fn worker_id(&self, role: WorkerRole) -> &str {
        match role {
            WorkerRole::Probe => &self.zond_id,
            WorkerRole::Manager => &self.mngr_id,
        }
    }

    /// 按角色写入领取者ID
    pub fn set_worker_id(&mut self, role: WorkerRole, worker_id: &str) {
        match role {
            WorkerRole::Probe => self.zond_id = worker_id.to_string(),
            WorkerRole::Manager => self.mngr_id = worker_id.to_string(),
        }
    }
}

/// 任务类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Ping,
    Head,
    Dns,
    Traceroute,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskKind::Ping => write!(f, "ping"),
            TaskKind::Head => write!(f, "head"),
            TaskKind::Dns => write!(f, "dns"),
            TaskKind::Traceroute => write!(f, "traceroute"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = TaskValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ping" => Ok(TaskKind::Ping),
            "head" => Ok(TaskKind::Head),
            "dns" => Ok(TaskKind::Dns),
            "traceroute" => Ok(TaskKind::Traceroute),
            _ => Err(TaskValidationError::UnknownKind),
        }
    }
}

impl TaskKind {
    /// 校验并规范化目标参数
    ///
    /// # 参数
    ///
    /// * `raw` - 调用方提交的原始参数（非空）
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 规范化后的参数
    /// * `Err(TaskValidationError)` - 参数不合法
    pub fn normalize_param(&self, raw: &str) -> Result<String, TaskValidationError> {
        match self {
            TaskKind::Head => {
                let (scheme, rest) = raw
                    .split_once("://")
                    .filter(|(scheme, _)| *scheme == "http" || *scheme == "https")
                    .ok_or(TaskValidationError::MissingScheme)?;
                let authority = rest
                    .split(['/', '?', '#'])
                    .next()
                    .unwrap_or_default();
                if !is_ip_or_hostname(authority) {
                    return Err(TaskValidationError::InvalidTarget);
                }
                Ok(format!("{}://{}", scheme, authority))
            }
            TaskKind::Dns => {
                let (query, resolver) = if raw.matches('-').count() == 1 {
                    raw.split_once('-').unwrap_or((raw, DEFAULT_RESOLVER))
                } else {
                    (raw, DEFAULT_RESOLVER)
                };
                if !is_ip_or_hostname(query) {
                    return Err(TaskValidationError::InvalidTarget);
                }
                if resolver != DEFAULT_RESOLVER && !is_ip_or_hostname(resolver) {
                    return Err(TaskValidationError::InvalidResolver);
                }
                Ok(format!("{}-{}", query, resolver))
            }
            TaskKind::Ping | TaskKind::Traceroute => {
                if is_ip_or_hostname(raw) {
                    Ok(raw.to_string())
                } else {
                    Err(TaskValidationError::InvalidTarget)
                }
            }
        }
    }
}

/// 任务主类型
///
/// `task` 由探针执行，`measurement` 由管理器领取。未知取值按 `task` 处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MainType {
    #[default]
    Task,
    Measurement,
}

impl From<String> for MainType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "measurement" => MainType::Measurement,
            _ => MainType::Task,
        }
    }
}

impl From<MainType> for String {
    fn from(value: MainType) -> Self {
        match value {
            MainType::Task => "task".to_string(),
            MainType::Measurement => "measurement".to_string(),
        }
    }
}

/// 重复周期
///
/// 固定取值集合，无法识别的取值一律视为 `single`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RepeatInterval {
    #[default]
    Single,
    FiveMinutes,
    TenMinutes,
    ThirtyMinutes,
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
    OneDay,
    OneWeek,
}

const REPEAT_TABLE: [(RepeatInterval, &str, i64); 10] = [
    (RepeatInterval::Single, "single", 0),
    (RepeatInterval::FiveMinutes, "5min", 300),
    (RepeatInterval::TenMinutes, "10min", 600),
    (RepeatInterval::ThirtyMinutes, "30min", 1800),
    (RepeatInterval::OneHour, "1hour", 3600),
    (RepeatInterval::ThreeHours, "3hour", 10800),
    (RepeatInterval::SixHours, "6hour", 21600),
    (RepeatInterval::TwelveHours, "12hour", 43200),
    (RepeatInterval::OneDay, "1day", 86400),
    (RepeatInterval::OneWeek, "1week", 604800),
];

impl RepeatInterval {
    /// 按标签解析，无法识别时返回 `Single`
    pub fn parse(label: &str) -> Self {
        REPEAT_TABLE
            .iter()
            .find(|(_, name, _)| *name == label)
            .map(|(interval, _, _)| *interval)
            .unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        REPEAT_TABLE
            .iter()
            .find(|(interval, _, _)| interval == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("single")
    }

    /// 周期长度（秒），`Single` 为0
    pub fn seconds(&self) -> i64 {
        REPEAT_TABLE
            .iter()
            .find(|(interval, _, _)| interval == self)
            .map(|(_, _, seconds)| *seconds)
            .unwrap_or(0)
    }

    pub fn is_repeating(&self) -> bool {
        *self != RepeatInterval::Single
    }

    /// 计算下一次执行所在的时间桶
    pub fn next_bucket(&self, now: i64) -> i64 {
        floor_to_bucket(now + self.seconds())
    }
}

impl From<String> for RepeatInterval {
    fn from(value: String) -> Self {
        RepeatInterval::parse(&value)
    }
}

impl From<RepeatInterval> for String {
    fn from(value: RepeatInterval) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for RepeatInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 任务校验错误
///
/// 错误文本即对外返回的 `error` 字段，保持固定
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    #[error("Missing required IP param")]
    MissingParam,

    #[error("wrong task type")]
    UnknownKind,

    #[error("must start with http(s)://")]
    MissingScheme,

    #[error("wrong ip/hostname")]
    InvalidTarget,

    #[error("wrong resolver")]
    InvalidResolver,

    #[error("Missing required UUID param.")]
    InvalidUuid,
}
