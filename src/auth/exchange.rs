//! # 身份交换
//!
//! 把外部身份提供商的登录成功事件换成本服务的会话：
//! 登记用户、保存提供商凭证、签发令牌对。

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::lifecycle::TokenLifecycleService;
use crate::auth::types::TokenPair;
use crate::directory::{CredentialStore, UserDirectory, UserRecord};
use crate::error::{GatewayError, Result};
use crate::{lerror, linfo, logging::{LogComponent, LogStage}};

/// 登录回调事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEvent {
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_refresh_credential: Option<String>,
}

/// 登录响应中的用户摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub identity: String,
    pub status: String,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            identity: user.identity.clone(),
            status: user.status.clone(),
        }
    }
}

/// 登录结果：令牌字段平铺，附带用户摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutput {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserSummary,
}

/// 身份交换服务
#[derive(Clone)]
pub struct IdentityExchange {
    users: Arc<dyn UserDirectory>,
    credentials: Arc<dyn CredentialStore>,
    lifecycle: Arc<TokenLifecycleService>,
}

impl IdentityExchange {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        credentials: Arc<dyn CredentialStore>,
        lifecycle: Arc<TokenLifecycleService>,
    ) -> Self {
        Self {
            users,
            credentials,
            lifecycle,
        }
    }

    /// 处理一次登录成功事件
    ///
    /// 任一步失败都返回 `IdentityExchangeFailed`。用户与凭证的写入以身份为键，
    /// 签发失败时它们保留下来，重试是安全的，但本次不返回任何令牌。
    pub async fn exchange(&self, event: &LoginEvent) -> Result<LoginOutput> {
        let identity = event.identity.as_str();
        if identity.trim().is_empty() {
            return Err(GatewayError::identity_exchange_failed("登录事件缺少身份标识"));
        }

        let result = self.run(identity, event.external_refresh_credential.as_deref()).await;
        if let Err(e) = &result {
            lerror!(
                identity,
                LogStage::Exchange,
                LogComponent::Exchange,
                "exchange_failed",
                &format!("身份交换失败: {e}")
            );
        }
        result
    }

    async fn run(&self, identity: &str, credential: Option<&str>) -> Result<LoginOutput> {
        let user = self
            .upsert_user(identity)
            .await
            .map_err(|e| GatewayError::identity_exchange_failed_with_source("登记用户失败", e))?;

        self.credentials
            .upsert(&user, credential)
            .await
            .map_err(|e| GatewayError::identity_exchange_failed_with_source("保存提供商凭证失败", e))?;

        let tokens = self
            .lifecycle
            .issue_pair(identity)
            .await
            .map_err(|e| GatewayError::identity_exchange_failed_with_source("签发令牌失败", e))?;

        linfo!(
            identity,
            LogStage::Exchange,
            LogComponent::Exchange,
            "exchange",
            &format!("登录完成: user_id={}", user.id)
        );

        Ok(LoginOutput {
            tokens,
            user: UserSummary::from(&user),
        })
    }

    async fn upsert_user(&self, identity: &str) -> Result<UserRecord> {
        match self.users.find_by_identity(identity).await? {
            Some(user) => Ok(user),
            None => self.users.create_user(identity).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenCodec;
    use crate::auth::keys::SigningKey;
    use crate::directory::{MockUserDirectory, ProviderCredential};
    use crate::session::MemorySessionStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// 只记录调用的凭证存储
    #[derive(Default)]
    struct RecordingCredentials {
        calls: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl CredentialStore for RecordingCredentials {
        async fn find_by_user(&self, _: &UserRecord) -> Result<Option<ProviderCredential>> {
            Ok(None)
        }

        async fn upsert(&self, user: &UserRecord, value: Option<&str>) -> Result<ProviderCredential> {
            self.calls.lock().unwrap().push(value.map(str::to_string));
            Ok(ProviderCredential {
                user_id: user.id,
                refresh_credential: value.map(str::to_string),
                updated_at: Utc::now(),
            })
        }
    }

    fn user(identity: &str) -> UserRecord {
        UserRecord {
            id: 7,
            identity: identity.to_string(),
            status: "ACTIVE".to_string(),
            created_at: Utc::now(),
        }
    }

    fn lifecycle() -> Arc<TokenLifecycleService> {
        let key = SigningKey::from_secret(b"exchange-test-secret-0123456789abcdef").unwrap();
        Arc::new(TokenLifecycleService::new(
            Arc::new(TokenCodec::new(Arc::new(key), 86400)),
            Arc::new(MemorySessionStore::new()),
        ))
    }

    #[tokio::test]
    async fn test_existing_user_is_not_recreated() {
        let mut users = MockUserDirectory::new();
        users
            .expect_find_by_identity()
            .returning(|identity| Ok(Some(user(identity))));
        users.expect_create_user().never();
        let credentials = Arc::new(RecordingCredentials::default());

        let exchange = IdentityExchange::new(Arc::new(users), credentials.clone(), lifecycle());
        let output = exchange
            .exchange(&LoginEvent {
                identity: "123".to_string(),
                external_refresh_credential: Some("provider-r1".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(output.user.id, 7);
        assert_eq!(output.tokens.token_type, "Bearer");
        assert_eq!(output.tokens.expires_in, 1800);
        assert_eq!(
            *credentials.calls.lock().unwrap(),
            vec![Some("provider-r1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_new_user_is_created_once() {
        let mut users = MockUserDirectory::new();
        users.expect_find_by_identity().times(1).returning(|_| Ok(None));
        users
            .expect_create_user()
            .times(1)
            .returning(|identity| Ok(user(identity)));

        let exchange = IdentityExchange::new(
            Arc::new(users),
            Arc::new(RecordingCredentials::default()),
            lifecycle(),
        );
        let output = exchange
            .exchange(&LoginEvent {
                identity: "123".to_string(),
                external_refresh_credential: None,
            })
            .await
            .unwrap();
        assert_eq!(output.user.identity, "123");
    }

    #[tokio::test]
    async fn test_directory_failure_maps_to_exchange_failed() {
        let mut users = MockUserDirectory::new();
        users
            .expect_find_by_identity()
            .returning(|_| Err(GatewayError::database("connection refused")));

        let exchange = IdentityExchange::new(
            Arc::new(users),
            Arc::new(RecordingCredentials::default()),
            lifecycle(),
        );
        let err = exchange
            .exchange(&LoginEvent {
                identity: "123".to_string(),
                external_refresh_credential: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::IdentityExchangeFailed { .. }));
    }

    #[tokio::test]
    async fn test_blank_identity_rejected() {
        let exchange = IdentityExchange::new(
            Arc::new(MockUserDirectory::new()),
            Arc::new(RecordingCredentials::default()),
            lifecycle(),
        );
        let err = exchange
            .exchange(&LoginEvent {
                identity: " ".to_string(),
                external_refresh_credential: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::IdentityExchangeFailed { .. }));
    }

    #[test]
    fn test_login_output_is_flat() {
        let output = LoginOutput {
            tokens: TokenPair::bearer("a".to_string(), "r".to_string()),
            user: UserSummary {
                id: 1,
                identity: "123".to_string(),
                status: "ACTIVE".to_string(),
            },
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["user"]["identity"], "123");
    }
}
