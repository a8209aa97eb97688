//! Errors raised on the token authentication path.

use thiserror::Error;

/// Reasons a presented token is rejected.
///
/// Every variant maps to the same generic 401 response; the variant is only
/// visible to logs and to in-process callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Bearer token was not provided")]
    MissingToken,

    #[error("Token signature or structure is invalid: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Presented refresh token is not the current session token")]
    TokenMismatch,
}

impl AuthError {
    /// Stable code used in logs.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::TokenMismatch => "TOKEN_MISMATCH",
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidToken(reason.into())
    }
}
