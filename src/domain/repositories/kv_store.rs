// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis错误
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    /// 其他存储错误
    #[error("Store error: {0}")]
    Other(String),
}

/// 键值存储特质
///
/// 协调服务唯一的持久化与协调介质。除 `set_remove` 返回实际删除数量外，
/// 不提供任何多键事务，跨请求的互斥完全依赖单条命令的原子性。
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 读取字符串值
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 写入字符串值，`ttl` 为 `None` 时永久保存
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// 删除键
    async fn del(&self, key: &str) -> Result<(), StoreError>;

    /// 向集合添加成员
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// 从集合移除成员
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 实际移除的成员数量，并发移除同一成员时仅有一个调用方得到1
    async fn set_remove(&self, key: &str, member: &str) -> Result<u64, StoreError>;

    /// 检查集合成员
    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// 获取集合全部成员
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// 集合基数
    async fn set_cardinality(&self, key: &str) -> Result<u64, StoreError>;

    /// 游标方式遍历集合
    ///
    /// # 参数
    ///
    /// * `key` - 集合键
    /// * `cursor` - 起始游标，首次调用传0
    /// * `count` - 每批数量提示
    ///
    /// # 返回值
    ///
    /// * `Ok((Vec<String>, u64))` - 本批成员和下一游标，游标为0表示遍历结束
    async fn set_scan(
        &self,
        key: &str,
        cursor: u64,
        count: usize,
    ) -> Result<(Vec<String>, u64), StoreError>;

    /// 按glob模式列出键
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// 写入哈希字段
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// 获取哈希全部取值
    async fn hash_values(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// 删除哈希字段
    async fn hash_delete(&self, key: &str, field: &str) -> Result<(), StoreError>;

    /// 批量读取字符串值，缺失的键对应 `None`
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;
}
