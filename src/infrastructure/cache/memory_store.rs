// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::kv_store::{KvStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
struct Inner {
    strings: HashMap<String, (String, Option<Instant>)>,
    sets: HashMap<String, BTreeSet<String>>,
    hashes: HashMap<String, BTreeMap<String, String>>,
}

impl Inner {
    fn live_string(&mut self, key: &str) -> Option<String> {
        let expired = match self.strings.get(key) {
            Some((_, Some(deadline))) => Instant::now() >= *deadline,
            Some((_, None)) => false,
            None => return None,
        };
        if expired {
            self.strings.remove(key);
            return None;
        }
        self.strings.get(key).map(|(value, _)| value.clone())
    }
}

/// 内存键值存储
///
/// 与Redis实现遵循同一契约：集合移除返回实际数量、字符串键支持TTL、
/// `keys` 支持 `*` 与 `?` 通配。TTL使用tokio时钟，测试中可通过暂停时钟推进。
/// 用于单机运行（`memory://`）和测试。
#[derive(Default)]
pub struct InMemoryKvStore {
    inner: Mutex<Inner>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.lock().live_string(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.inner
            .lock()
            .strings
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.strings.remove(key);
        inner.sets.remove(key);
        inner.hashes.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.inner
            .lock()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        let Some(set) = inner.sets.get_mut(key) else {
            return Ok(0);
        };
        let removed = set.remove(member);
        if set.is_empty() {
            inner.sets.remove(key);
        }
        Ok(u64::from(removed))
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get(key)
            .is_some_and(|set| set.contains(member)))
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_cardinality(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get(key)
            .map(|set| set.len() as u64)
            .unwrap_or(0))
    }

    async fn set_scan(
        &self,
        key: &str,
        cursor: u64,
        count: usize,
    ) -> Result<(Vec<String>, u64), StoreError> {
        let inner = self.inner.lock();
        let Some(set) = inner.sets.get(key) else {
            return Ok((Vec::new(), 0));
        };
        let start = cursor as usize;
        let count = count.max(1);
        let batch: Vec<String> = set.iter().skip(start).take(count).cloned().collect();
        let next = start + batch.len();
        let next = if next >= set.len() { 0 } else { next as u64 };
        Ok((batch, next))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        inner
            .strings
            .retain(|_, (_, deadline)| deadline.map_or(true, |deadline| now < deadline));
        let mut found: BTreeSet<String> = BTreeSet::new();
        found.extend(inner.strings.keys().filter(|k| glob_match(pattern, k)).cloned());
        found.extend(inner.sets.keys().filter(|k| glob_match(pattern, k)).cloned());
        found.extend(inner.hashes.keys().filter(|k| glob_match(pattern, k)).cloned());
        Ok(found.into_iter().collect())
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.inner
            .lock()
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_values(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .lock()
            .hashes
            .get(key)
            .map(|hash| hash.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if let Some(hash) = inner.hashes.get_mut(key) {
            hash.remove(field);
            if hash.is_empty() {
                inner.hashes.remove(key);
            }
        }
        Ok(())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        let mut inner = self.inner.lock();
        Ok(keys.iter().map(|key| inner.live_string(key)).collect())
    }
}

/// Redis风格的glob匹配，支持 `*` 和 `?`
fn glob_match(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();
    let (mut p, mut c) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while c < candidate.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == candidate[c]) {
            p += 1;
            c += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, c));
            p += 1;
        } else if let Some((star_p, star_c)) = star {
            p = star_p + 1;
            c = star_c + 1;
            star = Some((star_p, star_c + 1));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
#[path = "memory_store_test.rs"]
mod tests;
