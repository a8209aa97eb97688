//! 集成测试共享工具

#![allow(dead_code)]

use async_trait::async_trait;
use auth_gateway::{
    AppConfig, GatewayError, Result,
    app::AppContext,
    auth::TokenClass,
    config::{DatabaseConfig, JwtConfig},
    session::{MemorySessionStore, SessionStore},
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// 内存 SQLite，已执行迁移
pub async fn create_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            ..JwtConfig::default()
        },
        ..AppConfig::default()
    }
}

/// 内存会话存储 + 内存数据库装配出的上下文
pub async fn create_test_context() -> (Arc<AppContext>, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let context = AppContext::new(test_config(), create_test_db().await, store.clone()).unwrap();
    (Arc::new(context), store)
}

/// 可以切换为持续失败的会话存储
#[derive(Default)]
pub struct FlakySessionStore {
    inner: MemorySessionStore,
    failing: AtomicBool,
    failing_access_writes: AtomicBool,
}

impl FlakySessionStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 仅 access 记录的写入失败
    pub fn set_failing_access_writes(&self, failing: bool) {
        self.failing_access_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(GatewayError::store_unavailable("store offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for FlakySessionStore {
    async fn set(
        &self,
        identity: &str,
        class: TokenClass,
        value: &str,
        ttl: Duration,
    ) -> Result<()> {
        self.check()?;
        if class == TokenClass::Access && self.failing_access_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::store_unavailable("access write rejected"));
        }
        self.inner.set(identity, class, value, ttl).await
    }

    async fn get(&self, identity: &str, class: TokenClass) -> Result<Option<String>> {
        self.check()?;
        self.inner.get(identity, class).await
    }

    async fn delete(&self, identity: &str, class: TokenClass) -> Result<()> {
        self.check()?;
        self.inner.delete(identity, class).await
    }

    async fn compare_and_swap(
        &self,
        identity: &str,
        class: TokenClass,
        expected: &str,
        new: &str,
        ttl: Duration,
    ) -> Result<bool> {
        self.check()?;
        self.inner
            .compare_and_swap(identity, class, expected, new, ttl)
            .await
    }
}
