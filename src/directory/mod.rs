//! # 用户目录与提供商凭证
//!
//! 身份交换依赖的两个持久化协作方。以外部身份为键，
//! 重复调用幂等。

mod sea_orm_store;

pub use sea_orm_store::{SeaOrmCredentialStore, SeaOrmUserDirectory};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 内部用户记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub identity: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::users::Model> for UserRecord {
    fn from(model: entity::users::Model) -> Self {
        Self {
            id: model.id,
            identity: model.identity,
            status: model.status,
            created_at: model.created_at.and_utc(),
        }
    }
}

/// 提供商 refresh 凭证
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    pub user_id: i64,
    pub refresh_credential: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::provider_credentials::Model> for ProviderCredential {
    fn from(model: entity::provider_credentials::Model) -> Self {
        Self {
            user_id: model.user_id,
            refresh_credential: model.refresh_credential,
            updated_at: model.updated_at.and_utc(),
        }
    }
}

/// 用户目录
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserRecord>>;

    /// 创建用户；若并发请求已创建同一身份，返回已存在的记录
    async fn create_user(&self, identity: &str) -> Result<UserRecord>;
}

/// 提供商凭证存储
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_user(&self, user: &UserRecord) -> Result<Option<ProviderCredential>>;

    /// 单一写入入口
    ///
    /// - `Some(value)`：不存在则创建，存在则覆盖
    /// - `None`：不存在则创建空凭证，存在则保持原值
    async fn upsert(&self, user: &UserRecord, value: Option<&str>) -> Result<ProviderCredential>;
}
