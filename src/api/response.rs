//! # API 响应结构
//!
//! 错误统一为 `{"error": "..."}`。认证类错误一律返回相同的 401 文案，
//! 不暴露具体是哪一项检查失败。

use axum::{
    Json,
    http::{HeaderValue, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCategory, GatewayError};
use crate::{lerror, lwarn, logging::{LogComponent, LogStage}};

/// 认证失败时对外的统一文案
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// # 标准错误响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// # 简单消息响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl GatewayError {
    /// 对外暴露的错误文案
    fn public_message(&self) -> String {
        match self {
            Self::Auth(_) => UNAUTHORIZED_MESSAGE.to_string(),
            Self::StoreUnavailable { .. } => "Session store temporarily unavailable".to_string(),
            Self::IdentityExchangeFailed { .. } => "Login failed".to_string(),
            Self::NotFound { resource_type, .. } => format!("{resource_type} not found"),
            Self::Serialization { .. } => "Malformed request body".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = self.to_http_response_parts();

        match self.category() {
            ErrorCategory::Client => {
                let reason = self.auth_kind().map_or(code, |kind| kind.code());
                lwarn!(
                    "request",
                    LogStage::Request,
                    LogComponent::Handler,
                    "client_error",
                    &format!("请求被拒绝: status={}, reason={reason}", status.as_u16())
                );
            }
            ErrorCategory::Server => {
                lerror!(
                    "request",
                    LogStage::Request,
                    LogComponent::Handler,
                    "server_error",
                    &format!("请求处理失败: status={}, code={code}, error={self:?}", status.as_u16())
                );
            }
        }

        let mut response = (status, Json(ErrorBody::new(self.public_message()))).into_response();
        if self.is_retryable() {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use axum::http::StatusCode;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::MissingToken)]
    #[case(AuthError::invalid("bad signature"))]
    #[case(AuthError::ExpiredToken)]
    #[case(AuthError::TokenMismatch)]
    fn test_auth_errors_are_indistinguishable(#[case] kind: AuthError) {
        let err = GatewayError::from(kind);
        assert_eq!(err.public_message(), UNAUTHORIZED_MESSAGE);
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_store_unavailable_is_retryable_503() {
        let response = GatewayError::store_unavailable("timeout").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "1");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = GatewayError::database("table users is locked");
        assert_eq!(err.public_message(), "Internal server error");
    }
}
