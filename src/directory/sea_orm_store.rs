//! Sea-ORM 实现

use async_trait::async_trait;
use chrono::Utc;
use entity::{ProviderCredentials, Users, provider_credentials, users};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

use super::{CredentialStore, ProviderCredential, UserDirectory, UserRecord};
use crate::error::Result;
use crate::{ldebug, linfo, logging::{LogComponent, LogStage}};

/// 基于数据库的用户目录
#[derive(Debug, Clone)]
pub struct SeaOrmUserDirectory {
    db: DatabaseConnection,
}

impl SeaOrmUserDirectory {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for SeaOrmUserDirectory {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserRecord>> {
        let user = Users::find()
            .filter(users::Column::Identity.eq(identity))
            .one(&self.db)
            .await?;
        Ok(user.map(Into::into))
    }

    async fn create_user(&self, identity: &str) -> Result<UserRecord> {
        let model = users::ActiveModel {
            identity: Set(identity.to_string()),
            status: Set(users::STATUS_ACTIVE.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(created) => {
                linfo!(
                    identity,
                    LogStage::Db,
                    LogComponent::Directory,
                    "create_user",
                    &format!("创建用户: id={}", created.id)
                );
                Ok(created.into())
            }
            Err(err) => {
                // 唯一约束冲突：另一个请求已创建该身份
                if let Some(existing) = self.find_by_identity(identity).await? {
                    ldebug!(
                        identity,
                        LogStage::Db,
                        LogComponent::Directory,
                        "create_user_raced",
                        "用户已由并发请求创建"
                    );
                    return Ok(existing);
                }
                Err(err.into())
            }
        }
    }
}

/// 基于数据库的提供商凭证存储
#[derive(Debug, Clone)]
pub struct SeaOrmCredentialStore {
    db: DatabaseConnection,
}

impl SeaOrmCredentialStore {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, user_id: i64) -> Result<Option<provider_credentials::Model>> {
        Ok(ProviderCredentials::find()
            .filter(provider_credentials::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?)
    }

    async fn overwrite(
        &self,
        existing: provider_credentials::Model,
        value: &str,
    ) -> Result<ProviderCredential> {
        let mut active = existing.into_active_model();
        active.refresh_credential = Set(Some(value.to_string()));
        active.updated_at = Set(Utc::now().naive_utc());
        Ok(active.update(&self.db).await?.into())
    }
}

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn find_by_user(&self, user: &UserRecord) -> Result<Option<ProviderCredential>> {
        Ok(self.find_model(user.id).await?.map(Into::into))
    }

    async fn upsert(&self, user: &UserRecord, value: Option<&str>) -> Result<ProviderCredential> {
        match (self.find_model(user.id).await?, value) {
            (Some(existing), Some(value)) => self.overwrite(existing, value).await,
            (Some(existing), None) => Ok(existing.into()),
            (None, value) => {
                let now = Utc::now().naive_utc();
                let model = provider_credentials::ActiveModel {
                    user_id: Set(user.id),
                    refresh_credential: Set(value.map(str::to_string)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };

                match model.insert(&self.db).await {
                    Ok(created) => Ok(created.into()),
                    Err(err) => match (self.find_model(user.id).await?, value) {
                        (Some(existing), Some(value)) => self.overwrite(existing, value).await,
                        (Some(existing), None) => Ok(existing.into()),
                        (None, _) => Err(err.into()),
                    },
                }
            }
        }
    }
}
