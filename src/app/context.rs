//! 应用上下文（DI 容器）
//!
//! 统一持有跨模块共享的服务实例，便于在测试中注入替身实现。

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::auth::{
    AuthenticationGate, IdentityExchange, SigningKey, TokenCodec, TokenLifecycleService,
};
use crate::config::{AppConfig, SessionBackend, SessionStoreConfig};
use crate::database;
use crate::directory::{
    CredentialStore, SeaOrmCredentialStore, SeaOrmUserDirectory, UserDirectory,
};
use crate::error::{Context, GatewayError, Result};
use crate::session::{BoundedSessionStore, MemorySessionStore, RedisSessionStore, SessionStore};
use crate::{linfo, logging::{LogComponent, LogStage}};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub codec: Arc<TokenCodec>,
    pub gate: Arc<AuthenticationGate>,
    pub lifecycle: Arc<TokenLifecycleService>,
    pub exchange: Arc<IdentityExchange>,
    pub users: Arc<dyn UserDirectory>,
}

impl AppContext {
    /// 以给定的数据库连接与会话存储装配服务
    ///
    /// 会话存储在这里统一包上超时装饰器。
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        session_store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let key = Arc::new(SigningKey::from_secret(config.jwt.secret.as_bytes())?);
        let codec = Arc::new(TokenCodec::new(key, config.jwt.refresh_expires_in));

        let store: Arc<dyn SessionStore> = Arc::new(BoundedSessionStore::new(
            session_store,
            config.session_store.operation_timeout(),
        ));
        let lifecycle = Arc::new(TokenLifecycleService::new(codec.clone(), store));

        let users: Arc<dyn UserDirectory> = Arc::new(SeaOrmUserDirectory::new(db.clone()));
        let credentials: Arc<dyn CredentialStore> =
            Arc::new(SeaOrmCredentialStore::new(db.clone()));
        let exchange = Arc::new(IdentityExchange::new(
            users.clone(),
            credentials,
            lifecycle.clone(),
        ));

        let gate = Arc::new(AuthenticationGate::new(codec.clone()));

        Ok(Self {
            config: Arc::new(config),
            db,
            codec,
            gate,
            lifecycle,
            exchange,
            users,
        })
    }

    /// 按配置连接数据库、运行迁移、建立会话存储并装配服务
    pub async fn build(config: AppConfig) -> Result<Self> {
        let db = database::init_database(&config.database)
            .await
            .with_context(|| format!("无法连接数据库: {}", config.database.url))?;
        database::run_migrations(&db).await.context("数据库迁移失败")?;

        let store = build_session_store(&config.session_store).await?;
        Self::new(config, db, store)
    }
}

/// 根据配置选择会话存储后端
pub async fn build_session_store(config: &SessionStoreConfig) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match config.backend {
        SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
        SessionBackend::Redis => {
            let redis = config.redis.as_ref().ok_or_else(|| {
                GatewayError::config("session_store.backend = \"redis\" 需要 session_store.redis 配置")
            })?;
            Arc::new(RedisSessionStore::connect(redis).await?)
        }
    };

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::SessionStore,
        "session_store_ready",
        &format!(
            "会话存储就绪: backend={:?}, timeout={}ms",
            config.backend, config.operation_timeout_ms
        )
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, JwtConfig};

    fn memory_config() -> AppConfig {
        AppConfig {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                ..DatabaseConfig::default()
            },
            jwt: JwtConfig {
                secret: "context-test-secret-0123456789abcdef".to_string(),
                ..JwtConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_build_with_memory_backend() {
        let context = AppContext::build(memory_config()).await.unwrap();
        let pair = context.lifecycle.issue_pair("123").await.unwrap();
        assert!(context.codec.is_valid(&pair.access_token));
    }

    #[tokio::test]
    async fn test_short_secret_fails_wiring() {
        let mut config = memory_config();
        config.jwt.secret = "short".to_string();
        assert!(AppContext::build(config).await.is_err());
    }

    #[tokio::test]
    async fn test_database_failure_carries_context() {
        let mut config = memory_config();
        config.database.url = "mysql://127.0.0.1:1/auth".to_string();

        let err = AppContext::build(config).await.err().unwrap();
        assert!(matches!(err, GatewayError::Internal { .. }));
        assert!(err.to_string().contains("无法连接数据库"));
    }
}
