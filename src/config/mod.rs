//! # 配置管理模块
//!
//! 处理应用配置加载、验证和管理

mod app_config;
mod database;

pub use app_config::{
    ACCESS_TOKEN_TTL_SECS, AppConfig, DEFAULT_REFRESH_TOKEN_TTL_SECS, JwtConfig, MIN_SECRET_LEN,
    RedisConfig, ServerConfig, SessionBackend, SessionStoreConfig,
};
pub use database::DatabaseConfig;

use crate::error::{GatewayError, Result};
use crate::{linfo, logging::{LogComponent, LogStage}};
use std::env;
use std::path::Path;

/// 覆盖 `jwt.secret` 的环境变量
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// 按 `RUST_ENV` 加载 `config/config.{env}.toml`
pub fn load_config() -> Result<AppConfig> {
    let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    load_config_from(format!("config/config.{env}.toml"))
}

/// 从指定路径加载配置文件
pub fn load_config_from(path: impl AsRef<Path>) -> Result<AppConfig> {
    load_config_with(path, |name| env::var(name).ok())
}

/// 从指定路径加载配置文件，环境变量通过 `lookup` 读取
pub fn load_config_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(GatewayError::config(format!(
            "配置文件不存在: {}",
            path.display()
        )));
    }

    let config_content = std::fs::read_to_string(path).map_err(|e| {
        GatewayError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
    })?;

    let mut config: AppConfig = toml::from_str(&config_content)?;

    if let Some(secret) = lookup(JWT_SECRET_ENV) {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Config,
            "jwt_secret_override",
            "使用环境变量中的 JWT 密钥"
        );
        config.jwt.secret = secret;
    }

    // 验证配置的有效性
    config.validate().map_err(GatewayError::config)?;

    Ok(config)
}
