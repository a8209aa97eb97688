//! # 应用配置结构定义

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// access token 有效期（秒），固定值，亦作为响应中的 `expiresIn`
pub const ACCESS_TOKEN_TTL_SECS: i64 = 1800;

/// refresh token 默认有效期：14 天
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 14 * 24 * 60 * 60;

/// HS256 密钥最短长度（字节）
pub const MIN_SECRET_LEN: usize = 32;

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP 服务配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据库配置
    #[serde(default)]
    pub database: super::DatabaseConfig,
    /// 会话存储配置
    #[serde(default)]
    pub session_store: SessionStoreConfig,
    /// JWT 配置
    pub jwt: JwtConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// 监听地址字符串
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// 签名密钥
    pub secret: String,
    /// refresh token 有效期（秒）
    #[serde(default = "default_refresh_expires_in")]
    pub refresh_expires_in: i64,
}

const fn default_refresh_expires_in() -> i64 {
    DEFAULT_REFRESH_TOKEN_TTL_SECS
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            refresh_expires_in: DEFAULT_REFRESH_TOKEN_TTL_SECS,
        }
    }
}

/// 会话存储后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// 进程内存储，仅适用于单实例和测试
    #[default]
    Memory,
    /// Redis
    Redis,
}

/// 会话存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStoreConfig {
    /// 存储后端
    #[serde(default)]
    pub backend: SessionBackend,
    /// 单次存储操作超时（毫秒）
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    /// Redis 配置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisConfig>,
}

const fn default_operation_timeout_ms() -> u64 {
    2000
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            operation_timeout_ms: default_operation_timeout_ms(),
            redis: None,
        }
    }
}

impl SessionStoreConfig {
    /// 单次操作超时
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Redis配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis连接URL
    pub url: String,
    /// 连接超时时间（秒）
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

const fn default_connection_timeout() -> u64 {
    10
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/0".to_string(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

impl AppConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }

        if self.jwt.secret.trim().is_empty() {
            return Err("jwt.secret cannot be empty".to_string());
        }
        if self.jwt.secret.len() < MIN_SECRET_LEN {
            return Err(format!(
                "jwt.secret must be at least {MIN_SECRET_LEN} bytes for HS256"
            ));
        }
        if self.jwt.refresh_expires_in <= ACCESS_TOKEN_TTL_SECS {
            return Err(format!(
                "jwt.refresh_expires_in must be longer than the access token lifetime ({ACCESS_TOKEN_TTL_SECS}s)"
            ));
        }

        if self.database.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }

        if self.session_store.operation_timeout_ms == 0 {
            return Err("session_store.operation_timeout_ms must be greater than 0".to_string());
        }
        match self.session_store.backend {
            SessionBackend::Memory => {
                if self.session_store.redis.is_some() {
                    return Err(
                        "session_store.redis 配置仅在 backend = \"redis\" 时可用".to_string()
                    );
                }
            }
            SessionBackend::Redis => {
                let redis = self
                    .session_store
                    .redis
                    .as_ref()
                    .ok_or_else(|| "Redis session store configuration must be provided".to_string())?;
                if redis.url.is_empty() {
                    return Err("Redis URL cannot be empty".to_string());
                }
            }
        }

        Ok(())
    }
}
