//! # 认证中间件
//!
//! 从请求头中提取 Bearer token，仅凭签名与有效期验证，并把请求级身份
//! 注入到请求扩展中。不查询会话存储；验证失败时降级为匿名请求继续处理，
//! 由下游处理器决定是否允许匿名访问。

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::jwt::TokenCodec;
use crate::auth::types::{RequestIdentity, TokenClass};
use crate::auth::utils::AuthUtils;
use crate::error::AuthError;
use crate::{ldebug, logging::{LogComponent, LogStage, token_preview}};

/// 请求认证闸门
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    codec: Arc<TokenCodec>,
    /// Skip authentication for certain paths
    skip_paths: Vec<String>,
}

impl AuthenticationGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self {
            codec,
            skip_paths: vec!["/health".to_string(), "/api/auth/login".to_string()],
        }
    }

    /// Add path to skip authentication
    #[must_use]
    pub fn skip_path(mut self, path: impl Into<String>) -> Self {
        self.skip_paths.push(path.into());
        self
    }

    /// Check if path should skip authentication
    #[must_use]
    pub fn should_skip_auth(&self, path: &str) -> bool {
        self.skip_paths
            .iter()
            .any(|skip_path| path == skip_path || path.starts_with(&format!("{skip_path}/")))
    }

    /// 根据请求头确定请求级身份
    #[must_use]
    pub fn identify(&self, headers: &HeaderMap) -> RequestIdentity {
        let Some(token) = AuthUtils::bearer_token_from_headers(headers) else {
            return RequestIdentity::Anonymous;
        };

        let rejected = match self.codec.parse(token) {
            Ok(claims) if claims.class() == TokenClass::Access => {
                return RequestIdentity::authenticated(claims.sub);
            }
            Ok(_) => AuthError::invalid("refresh token presented as access token"),
            Err(e) => e.auth_kind().cloned().unwrap_or_else(|| AuthError::invalid(e.to_string())),
        };

        ldebug!(
            "anonymous",
            LogStage::Authentication,
            LogComponent::AuthGate,
            "token_rejected",
            &format!("令牌未通过验证 ({}): {}", rejected.code(), token_preview(token))
        );
        RequestIdentity::Anonymous
    }
}

/// Axum认证中间件
///
/// 每个请求都会得到一个 `RequestIdentity` 扩展，先前存在的值会被覆盖。
pub async fn authenticate(
    State(gate): State<Arc<AuthenticationGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = if gate.should_skip_auth(request.uri().path()) {
        RequestIdentity::Anonymous
    } else {
        gate.identify(request.headers())
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::keys::SigningKey;
    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use chrono::{Duration, Utc};

    fn gate() -> AuthenticationGate {
        let key = SigningKey::from_secret(b"gate-test-secret-0123456789abcdefgh").unwrap();
        AuthenticationGate::new(Arc::new(TokenCodec::new(Arc::new(key), 86400)))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_access_token_authenticates() {
        let gate = gate();
        let token = gate.codec.issue("123", TokenClass::Access, Utc::now()).unwrap();
        assert_eq!(
            gate.identify(&bearer(&token)),
            RequestIdentity::authenticated("123")
        );
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(gate().identify(&HeaderMap::new()), RequestIdentity::Anonymous);
    }

    #[test]
    fn test_bad_tokens_degrade_to_anonymous() {
        let gate = gate();
        let expired = gate
            .codec
            .issue("123", TokenClass::Access, Utc::now() - Duration::hours(2))
            .unwrap();
        let refresh = gate.codec.issue("123", TokenClass::Refresh, Utc::now()).unwrap();

        for token in [expired.as_str(), refresh.as_str(), "garbage"] {
            assert_eq!(gate.identify(&bearer(token)), RequestIdentity::Anonymous);
        }
    }

    #[test]
    fn test_skip_paths() {
        let gate = gate().skip_path("/public");
        assert!(gate.should_skip_auth("/health"));
        assert!(gate.should_skip_auth("/api/auth/login/callback"));
        assert!(gate.should_skip_auth("/public/docs"));
        assert!(!gate.should_skip_auth("/api/auth/logout"));
        assert!(!gate.should_skip_auth("/healthz"));
    }
}
