// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::kv_store::{KvStore, StoreError};
use anyhow::Result;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis客户端
///
/// 基于多路复用连接实现 `KvStore`，连接在实例间共享
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(anyhow::Error)` - 创建过程中出现的错误
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self { connection })
    }

    fn con(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

#[async_trait]
impl KvStore for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = self.con().get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut con = self.con();
        match ttl {
            Some(ttl) => {
                con.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                    .await?
            }
            None => con.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.con().del::<_, ()>(key).await?;
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.con().sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<u64, StoreError> {
        let removed: u64 = self.con().srem(key, member).await?;
        Ok(removed)
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let found: bool = self.con().sismember(key, member).await?;
        Ok(found)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let members: Vec<String> = self.con().smembers(key).await?;
        Ok(members)
    }

    async fn set_cardinality(&self, key: &str) -> Result<u64, StoreError> {
        let count: u64 = self.con().scard(key).await?;
        Ok(count)
    }

    async fn set_scan(
        &self,
        key: &str,
        cursor: u64,
        count: usize,
    ) -> Result<(Vec<String>, u64), StoreError> {
        let mut con = self.con();
        let (next, batch): (u64, Vec<String>) = redis::cmd("SSCAN")
            .arg(key)
            .arg(cursor)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut con)
            .await?;
        Ok((batch, next))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let found: Vec<String> = self.con().keys(pattern).await?;
        Ok(found)
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.con().hset::<_, _, _, ()>(key, field, value).await?;
        Ok(())
    }

    async fn hash_values(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let values: Vec<String> = self.con().hvals(key).await?;
        Ok(values)
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<(), StoreError> {
        self.con().hdel::<_, _, ()>(key, field).await?;
        Ok(())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        // Always MGET so a single key still decodes as an array
        let mut con = self.con();
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(keys).query_async(&mut con).await?;
        Ok(values)
    }
}
