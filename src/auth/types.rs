//! # 认证类型定义
//!
//! 令牌载荷、令牌对响应以及请求级身份

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ACCESS_TOKEN_TTL_SECS;

/// 令牌类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    /// 短期访问令牌
    Access,
    /// 长期刷新令牌
    Refresh,
}

impl TokenClass {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }

    /// 会话存储中的键前缀
    #[must_use]
    pub const fn key_prefix(&self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT 载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 外部身份标识
    pub sub: String,
    /// 令牌类别
    pub token_type: TokenClass,
    /// 签发时间
    pub iat: i64,
    /// 过期时间
    pub exp: i64,
    /// JWT ID
    pub jti: String,
}

impl TokenClaims {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub const fn class(&self) -> TokenClass {
        self.token_type
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// `exp <= now` 即视为过期
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Token pair structure
///
/// 登录和刷新共用的响应体：`{accessToken, refreshToken, tokenType, expiresIn}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 固定为 "Bearer"
    pub token_type: String,
    /// access token 剩余秒数
    pub expires_in: i64,
}

impl TokenPair {
    #[must_use]
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_TTL_SECS,
        }
    }
}

/// 所有已认证用户共有的唯一角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
        }
    }
}

/// 请求级身份，由认证闸门写入请求扩展
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestIdentity {
    #[default]
    Anonymous,
    Authenticated { subject: String, role: Role },
}

impl RequestIdentity {
    #[must_use]
    pub fn authenticated(subject: impl Into<String>) -> Self {
        Self::Authenticated {
            subject: subject.into(),
            role: Role::User,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Authenticated { subject, .. } => Some(subject),
            Self::Anonymous => None,
        }
    }
}
