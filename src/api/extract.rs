//! # 请求提取器

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::types::{RequestIdentity, Role};
use crate::error::{AuthError, GatewayError};

/// 已认证用户；匿名请求在提取阶段即以 401 拒绝
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub identity: String,
    pub role: Role,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestIdentity>() {
            Some(RequestIdentity::Authenticated { subject, role }) => Ok(Self {
                identity: subject.clone(),
                role: *role,
            }),
            _ => Err(AuthError::MissingToken.into()),
        }
    }
}
