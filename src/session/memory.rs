//! # 进程内会话存储
//!
//! 单实例部署与测试使用。过期项在读取时惰性清除，每次写入时整体清扫一次。

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

use super::{SessionStore, session_key};
use crate::auth::types::TokenClass;
use crate::error::Result;

/// 缓存项
#[derive(Debug, Clone)]
struct SessionEntry {
    value: String,
    expires_at: Instant,
}

impl SessionEntry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// 基于 `DashMap` 的会话存储
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, SessionEntry>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 未过期记录数
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清除所有已过期的记录
    pub fn cleanup_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(
        &self,
        identity: &str,
        class: TokenClass,
        value: &str,
        ttl: Duration,
    ) -> Result<()> {
        self.cleanup_expired();
        self.entries
            .insert(session_key(class, identity), SessionEntry::new(value, ttl));
        Ok(())
    }

    async fn get(&self, identity: &str, class: TokenClass) -> Result<Option<String>> {
        let key = session_key(class, identity);
        if self.entries.remove_if(&key, |_, e| e.is_expired()).is_some() {
            return Ok(None);
        }
        Ok(self.entries.get(&key).map(|e| e.value.clone()))
    }

    async fn delete(&self, identity: &str, class: TokenClass) -> Result<()> {
        self.entries.remove(&session_key(class, identity));
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        identity: &str,
        class: TokenClass,
        expected: &str,
        new: &str,
        ttl: Duration,
    ) -> Result<bool> {
        // entry 持有分片写锁，比较与替换之间不会插入其他写入
        match self.entries.entry(session_key(class, identity)) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get();
                if current.is_expired() || current.value != expected {
                    return Ok(false);
                }
                occupied.insert(SessionEntry::new(new, ttl));
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemorySessionStore::new();
        store.set("123", TokenClass::Refresh, "r1", TTL).await.unwrap();

        assert_eq!(
            store.get("123", TokenClass::Refresh).await.unwrap().as_deref(),
            Some("r1")
        );
        assert_eq!(store.get("123", TokenClass::Access).await.unwrap(), None);

        store.delete("123", TokenClass::Refresh).await.unwrap();
        assert_eq!(store.get("123", TokenClass::Refresh).await.unwrap(), None);
        store.delete("123", TokenClass::Refresh).await.unwrap();
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let store = MemorySessionStore::new();
        store
            .set("123", TokenClass::Access, "a1", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("123", TokenClass::Access).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_write_sweeps_expired_entries() {
        let store = MemorySessionStore::new();
        for i in 0..1000 {
            store
                .set(&format!("user-{i}"), TokenClass::Refresh, "r", Duration::from_millis(5))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(30)).await;

        store.set("fresh", TokenClass::Refresh, "r", TTL).await.unwrap();
        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let store = MemorySessionStore::new();
        assert!(
            !store
                .compare_and_swap("123", TokenClass::Refresh, "r1", "r2", TTL)
                .await
                .unwrap()
        );

        store.set("123", TokenClass::Refresh, "r1", TTL).await.unwrap();
        assert!(
            !store
                .compare_and_swap("123", TokenClass::Refresh, "other", "r2", TTL)
                .await
                .unwrap()
        );
        assert!(
            store
                .compare_and_swap("123", TokenClass::Refresh, "r1", "r2", TTL)
                .await
                .unwrap()
        );
        assert!(
            !store
                .compare_and_swap("123", TokenClass::Refresh, "r1", "r3", TTL)
                .await
                .unwrap()
        );
        assert_eq!(
            store.get("123", TokenClass::Refresh).await.unwrap().as_deref(),
            Some("r2")
        );
    }
}
