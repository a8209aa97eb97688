//! # Redis 会话存储
//!
//! 提供 Redis 连接管理和会话记录读写

use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use std::time::Duration;

use super::{SessionStore, session_key};
use crate::auth::types::TokenClass;
use crate::config::RedisConfig;
use crate::error::{GatewayError, Result};
use crate::{ldebug, linfo, logging::{LogComponent, LogStage}};

/// 当前值等于 ARGV[1] 时写入 ARGV[2]，TTL 为 ARGV[3] 秒
const COMPARE_AND_SWAP_SCRIPT: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
    return 1
end
return 0
";

/// Redis 会话存储
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Redis 连接管理器
    connection_manager: ConnectionManager,
    compare_and_swap: Script,
}

impl RedisSessionStore {
    /// 建立连接
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::SessionStore,
            "connect_to_redis",
            "正在连接 Redis 会话存储"
        );

        let client = Client::open(config.url.as_str())
            .map_err(|e| GatewayError::config_with_source("创建 Redis 客户端失败", e))?;

        let connect_timeout = Duration::from_secs(config.connection_timeout);
        let connection_manager = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| GatewayError::store_unavailable("建立 Redis 连接超时"))?
            .map_err(|e| GatewayError::store_unavailable_with_source("建立 Redis 连接失败", e))?;

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::SessionStore,
            "redis_connected",
            "Redis 连接建立成功"
        );

        Ok(Self {
            connection_manager,
            compare_and_swap: Script::new(COMPARE_AND_SWAP_SCRIPT),
        })
    }
}

/// Redis 的过期时间至少为 1 秒
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set(
        &self,
        identity: &str,
        class: TokenClass,
        value: &str,
        ttl: Duration,
    ) -> Result<()> {
        let key = session_key(class, identity);
        ldebug!(
            "system",
            LogStage::Session,
            LogComponent::SessionStore,
            "set_session",
            &format!("写入会话记录: key={key}, ttl={}s", ttl_seconds(ttl))
        );

        let mut conn = self.connection_manager.clone();
        conn.set_ex::<_, _, ()>(&key, value, ttl_seconds(ttl))
            .await
            .map_err(|e| GatewayError::store_unavailable_with_source(format!("写入会话记录失败: {key}"), e))
    }

    async fn get(&self, identity: &str, class: TokenClass) -> Result<Option<String>> {
        let key = session_key(class, identity);
        let mut conn = self.connection_manager.clone();

        let value: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| GatewayError::store_unavailable_with_source(format!("读取会话记录失败: {key}"), e))?;

        ldebug!(
            "system",
            LogStage::Session,
            LogComponent::SessionStore,
            "get_session",
            &format!("读取会话记录: key={key}, hit={}", value.is_some())
        );
        Ok(value)
    }

    async fn delete(&self, identity: &str, class: TokenClass) -> Result<()> {
        let key = session_key(class, identity);
        let mut conn = self.connection_manager.clone();

        let deleted: i64 = conn
            .del(&key)
            .await
            .map_err(|e| GatewayError::store_unavailable_with_source(format!("删除会话记录失败: {key}"), e))?;

        ldebug!(
            "system",
            LogStage::Session,
            LogComponent::SessionStore,
            "delete_session",
            &format!("删除会话记录: key={key}, deleted={}", deleted > 0)
        );
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
        let key = session_key(class, identity);
        let mut conn = self.connection_manager.clone();

        let mut invocation = self.compare_and_swap.key(&key);
        invocation.arg(expected).arg(new).arg(ttl_seconds(ttl));
        let swapped: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(|e| GatewayError::store_unavailable_with_source(format!("会话记录比较替换失败: {key}"), e))?;

        ldebug!(
            "system",
            LogStage::Session,
            LogComponent::SessionStore,
            "compare_and_swap",
            &format!("会话记录比较替换: key={key}, swapped={}", swapped == 1)
        );
        Ok(swapped == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_seconds_rounds_up_to_one() {
        assert_eq!(ttl_seconds(Duration::from_millis(10)), 1);
        assert_eq!(ttl_seconds(Duration::from_secs(1800)), 1800);
    }

    fn redis_config() -> Option<RedisConfig> {
        std::env::var("REDIS_URL").ok().map(|url| RedisConfig {
            url,
            ..RedisConfig::default()
        })
    }

    #[tokio::test]
    #[ignore = "requires REDIS_URL"]
    async fn test_redis_round_trip_and_cas() {
        let Some(config) = redis_config() else {
            return;
        };
        let store = RedisSessionStore::connect(&config).await.unwrap();
        let identity = format!("test-{}", uuid::Uuid::new_v4());
        let ttl = Duration::from_secs(30);

        store.set(&identity, TokenClass::Refresh, "r1", ttl).await.unwrap();
        assert_eq!(
            store.get(&identity, TokenClass::Refresh).await.unwrap().as_deref(),
            Some("r1")
        );

        assert!(!store.compare_and_swap(&identity, TokenClass::Refresh, "x", "r2", ttl).await.unwrap());
        assert!(store.compare_and_swap(&identity, TokenClass::Refresh, "r1", "r2", ttl).await.unwrap());
        assert_eq!(
            store.get(&identity, TokenClass::Refresh).await.unwrap().as_deref(),
            Some("r2")
        );

        store.delete(&identity, TokenClass::Refresh).await.unwrap();
        assert_eq!(store.get(&identity, TokenClass::Refresh).await.unwrap(), None);
    }
}
