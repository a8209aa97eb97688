//! # 带超时的会话存储
//!
//! 为任意 `SessionStore` 的每次调用加上超时，超时转为可重试的 `StoreUnavailable`。

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::SessionStore;
use crate::auth::types::TokenClass;
use crate::error::{GatewayError, Result};
use crate::{lwarn, logging::{LogComponent, LogStage}};

/// 超时装饰器
#[derive(Clone)]
pub struct BoundedSessionStore {
    inner: Arc<dyn SessionStore>,
    timeout: Duration,
}

impl BoundedSessionStore {
    pub fn new(inner: Arc<dyn SessionStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        if let Ok(result) = tokio::time::timeout(self.timeout, fut).await {
            result
        } else {
            lwarn!(
                "system",
                LogStage::Session,
                LogComponent::SessionStore,
                operation,
                &format!("会话存储操作超时: {}ms", self.timeout.as_millis())
            );
            Err(GatewayError::store_unavailable(format!(
                "会话存储操作 {operation} 超时"
            )))
        }
    }
}

#[async_trait]
impl SessionStore for BoundedSessionStore {
    async fn set(
        &self,
        identity: &str,
        class: TokenClass,
        value: &str,
        ttl: Duration,
    ) -> Result<()> {
        self.bounded("set", self.inner.set(identity, class, value, ttl))
            .await
    }

    async fn get(&self, identity: &str, class: TokenClass) -> Result<Option<String>> {
        self.bounded("get", self.inner.get(identity, class)).await
    }

    async fn delete(&self, identity: &str, class: TokenClass) -> Result<()> {
        self.bounded("delete", self.inner.delete(identity, class))
            .await
    }

    async fn compare_and_swap(
        &self,
        identity: &str,
        class: TokenClass,
        expected: &str,
        new: &str,
        ttl: Duration,
    ) -> Result<bool> {
        self.bounded(
            "compare_and_swap",
            self.inner
                .compare_and_swap(identity, class, expected, new, ttl),
        )
        .await
    }
}
