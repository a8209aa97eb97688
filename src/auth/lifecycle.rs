//! # 令牌生命周期
//!
//! 签发令牌对、轮换 refresh token、撤销会话。
//! 会话存储里的记录代表"当前值"，与令牌本身的签名有效性相互独立。

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::jwt::TokenCodec;
use crate::auth::types::{TokenClass, TokenPair};
use crate::error::{AuthError, GatewayError, Result};
use crate::session::SessionStore;
use crate::{ldebug, linfo, lwarn, logging::{LogComponent, LogStage, token_preview}};

/// 令牌生命周期服务
#[derive(Clone)]
pub struct TokenLifecycleService {
    codec: Arc<TokenCodec>,
    store: Arc<dyn SessionStore>,
}

impl TokenLifecycleService {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn SessionStore>) -> Self {
        Self { codec, store }
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    fn store_ttl(&self, class: TokenClass) -> Result<Duration> {
        self.codec
            .ttl(class)
            .to_std()
            .map_err(|e| GatewayError::internal_with_source("令牌有效期超出范围", e))
    }

    fn mint_pair(&self, identity: &str) -> Result<TokenPair> {
        let now = Utc::now();
        let access = self.codec.issue(identity, TokenClass::Access, now)?;
        let refresh = self.codec.issue(identity, TokenClass::Refresh, now)?;
        Ok(TokenPair::bearer(access, refresh))
    }

    /// 签发新的令牌对并覆盖两条会话记录
    pub async fn issue_pair(&self, identity: &str) -> Result<TokenPair> {
        let pair = self.mint_pair(identity)?;

        self.store
            .set(
                identity,
                TokenClass::Access,
                &pair.access_token,
                self.store_ttl(TokenClass::Access)?,
            )
            .await?;
        self.store
            .set(
                identity,
                TokenClass::Refresh,
                &pair.refresh_token,
                self.store_ttl(TokenClass::Refresh)?,
            )
            .await?;

        linfo!(
            identity,
            LogStage::Session,
            LogComponent::Lifecycle,
            "issue_pair",
            "签发令牌对"
        );
        Ok(pair)
    }

    /// 用当前 refresh token 换取新的令牌对
    ///
    /// 旧 refresh token 必须与存储中的当前值逐字节相等，替换通过比较交换完成，
    /// 并发提交同一旧令牌时只有一个调用成功，其余返回 `TokenMismatch`。
    pub async fn refresh(&self, old_refresh_token: &str) -> Result<TokenPair> {
        if old_refresh_token.trim().is_empty() {
            return Err(AuthError::MissingToken.into());
        }

        let claims = self.codec.parse(old_refresh_token)?;
        if claims.class() != TokenClass::Refresh {
            return Err(AuthError::invalid("not a refresh token").into());
        }
        let identity = claims.subject();

        let current = self.store.get(identity, TokenClass::Refresh).await?;
        if current.as_deref() != Some(old_refresh_token) {
            lwarn!(
                identity,
                LogStage::Session,
                LogComponent::Lifecycle,
                "refresh_mismatch",
                &format!(
                    "refresh token 不是当前值: {}",
                    token_preview(old_refresh_token)
                )
            );
            return Err(AuthError::TokenMismatch.into());
        }

        let pair = self.mint_pair(identity)?;
        let refresh_ttl = self.store_ttl(TokenClass::Refresh)?;
        let access_ttl = self.store_ttl(TokenClass::Access)?;
        let swapped = self
            .store
            .compare_and_swap(
                identity,
                TokenClass::Refresh,
                old_refresh_token,
                &pair.refresh_token,
                refresh_ttl,
            )
            .await?;
        if !swapped {
            lwarn!(
                identity,
                LogStage::Session,
                LogComponent::Lifecycle,
                "refresh_lost_race",
                "并发刷新，当前值已被替换"
            );
            return Err(AuthError::TokenMismatch.into());
        }

        // refresh 记录已轮换，此后失败不能让调用方丢失新令牌
        if let Err(e) = self
            .store
            .set(identity, TokenClass::Access, &pair.access_token, access_ttl)
            .await
        {
            lwarn!(
                identity,
                LogStage::Session,
                LogComponent::Lifecycle,
                "refresh_access_write_failed",
                &format!("access 记录写入失败，仍返回新令牌对: {e}")
            );
        }

        ldebug!(
            identity,
            LogStage::Session,
            LogComponent::Lifecycle,
            "refresh",
            "refresh token 轮换完成"
        );
        Ok(pair)
    }

    /// 删除两条会话记录；已签发的 access token 仍在自然过期前有效
    pub async fn revoke(&self, identity: &str) -> Result<()> {
        self.store.delete(identity, TokenClass::Access).await?;
        self.store.delete(identity, TokenClass::Refresh).await?;

        linfo!(
            identity,
            LogStage::Session,
            LogComponent::Lifecycle,
            "revoke",
            "会话已撤销"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::keys::SigningKey;
    use crate::session::MemorySessionStore;

    fn create_service() -> (TokenLifecycleService, Arc<MemorySessionStore>) {
        let key = SigningKey::from_secret(b"lifecycle-test-secret-0123456789abcdef").unwrap();
        let codec = Arc::new(TokenCodec::new(Arc::new(key), 86400));
        let store = Arc::new(MemorySessionStore::new());
        (TokenLifecycleService::new(codec, store.clone()), store)
    }

    #[tokio::test]
    async fn test_issue_pair_writes_both_records() {
        let (service, store) = create_service();
        let pair = service.issue_pair("123").await.unwrap();

        assert_eq!(
            store.get("123", TokenClass::Access).await.unwrap(),
            Some(pair.access_token.clone())
        );
        assert_eq!(
            store.get("123", TokenClass::Refresh).await.unwrap(),
            Some(pair.refresh_token.clone())
        );

        let access = service.codec().parse(&pair.access_token).unwrap();
        let refresh = service.codec().parse(&pair.refresh_token).unwrap();
        assert_eq!(access.subject(), "123");
        assert_eq!(access.class(), TokenClass::Access);
        assert_eq!(refresh.class(), TokenClass::Refresh);
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_old_token_is_dead() {
        let (service, store) = create_service();
        let first = service.issue_pair("123").await.unwrap();

        let second = service.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);
        assert_eq!(
            store.get("123", TokenClass::Refresh).await.unwrap(),
            Some(second.refresh_token.clone())
        );

        let err = service.refresh(&first.refresh_token).await.unwrap_err();
        assert_eq!(err.auth_kind(), Some(&AuthError::TokenMismatch));
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let (service, _) = create_service();
        let pair = service.issue_pair("123").await.unwrap();

        let err = service.refresh(&pair.access_token).await.unwrap_err();
        assert!(matches!(err.auth_kind(), Some(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_blank_refresh_token() {
        let (service, _) = create_service();
        let err = service.refresh("  ").await.unwrap_err();
        assert_eq!(err.auth_kind(), Some(&AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_revoke_then_refresh_fails() {
        let (service, store) = create_service();
        let pair = service.issue_pair("123").await.unwrap();

        service.revoke("123").await.unwrap();
        assert!(store.is_empty());

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err.auth_kind(), Some(&AuthError::TokenMismatch));
        // access token 仍然签名有效
        assert!(service.codec().is_valid(&pair.access_token));
    }

    #[tokio::test]
    async fn test_never_logged_in_identity_fails_closed() {
        let (service, _) = create_service();
        let forged = service
            .codec()
            .issue("999", TokenClass::Refresh, Utc::now())
            .unwrap();

        let err = service.refresh(&forged).await.unwrap_err();
        assert_eq!(err.auth_kind(), Some(&AuthError::TokenMismatch));
    }
}
