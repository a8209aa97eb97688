//! # 认证工具函数

use axum::http::{HeaderMap, header::AUTHORIZATION};

/// 认证工具类
pub struct AuthUtils;

impl AuthUtils {
    /// `从HTTP头中提取Authorization头的值`
    #[must_use]
    pub fn extract_authorization_header(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }

    /// `从Authorization头中提取Bearer` token
    ///
    /// # 返回
    /// - `Some(&str)`: Bearer token部分（去除首尾空白，非空）
    /// - `None`: 不是Bearer类型的认证头，或 token 为空
    #[must_use]
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// 直接从请求头取出 Bearer token
    #[must_use]
    pub fn bearer_token_from_headers(headers: &HeaderMap) -> Option<&str> {
        Self::extract_authorization_header(headers).and_then(Self::extract_bearer_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    #[rstest]
    #[case("Bearer abc.def.ghi", Some("abc.def.ghi"))]
    #[case("Bearer   padded  ", Some("padded"))]
    #[case("Bearer ", None)]
    #[case("Basic dXNlcjpwYXNz", None)]
    #[case("abc.def.ghi", None)]
    fn test_extract_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(AuthUtils::extract_bearer_token(header), expected);
    }

    #[test]
    fn test_bearer_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(AuthUtils::bearer_token_from_headers(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token-1"));
        assert_eq!(AuthUtils::bearer_token_from_headers(&headers), Some("token-1"));
    }
}
