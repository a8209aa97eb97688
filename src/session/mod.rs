//! # 会话存储
//!
//! 保存每个外部身份"当前有效"的 access / refresh 令牌。
//! 键按令牌类别分命名空间：`access_token:<id>` 与 `refresh_token:<id>`。

mod bounded;
mod memory;
mod redis_store;

pub use bounded::BoundedSessionStore;
pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;

use async_trait::async_trait;
use std::time::Duration;

use crate::auth::types::TokenClass;
use crate::error::Result;

/// 带 TTL 的会话记录存储
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 写入（覆盖）当前值
    async fn set(&self, identity: &str, class: TokenClass, value: &str, ttl: Duration)
    -> Result<()>;

    /// 读取当前值，过期或不存在时返回 `None`
    async fn get(&self, identity: &str, class: TokenClass) -> Result<Option<String>>;

    /// 删除当前值，不存在时不报错
    async fn delete(&self, identity: &str, class: TokenClass) -> Result<()>;

    /// 仅当当前值等于 `expected` 时原子地替换为 `new`
    ///
    /// 返回是否替换成功。当前值缺失或已过期视为不相等。
    async fn compare_and_swap(
        &self,
        identity: &str,
        class: TokenClass,
        expected: &str,
        new: &str,
        ttl: Duration,
    ) -> Result<bool>;
}

/// 会话记录的存储键
#[must_use]
pub fn session_key(class: TokenClass, identity: &str) -> String {
    format!("{}:{identity}", class.key_prefix())
}
