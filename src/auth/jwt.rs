//! JWT token codec
//!
//! Issues and parses the gateway's own HS256 tokens. Pure function of the
//! signing key and the clock; never touches the session store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header, TokenData, Validation, decode, encode};
use std::sync::Arc;

use crate::auth::keys::SigningKey;
use crate::auth::types::{TokenClaims, TokenClass};
use crate::config::ACCESS_TOKEN_TTL_SECS;
use crate::error::{AuthError, GatewayError, Result};
use crate::{ldebug, logging::{LogComponent, LogStage, token_preview}};

/// JWT token codec
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: Arc<SigningKey>,
    validation: Validation,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec for the given key and refresh lifetime in seconds
    #[must_use]
    pub fn new(key: Arc<SigningKey>, refresh_ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `parse_at`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            key,
            validation,
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    /// Lifetime of a token of the given class
    #[must_use]
    pub fn ttl(&self, class: TokenClass) -> Duration {
        match class {
            TokenClass::Access => Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            TokenClass::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a new token for `subject` issued at `now`
    pub fn issue(&self, subject: &str, class: TokenClass, now: DateTime<Utc>) -> Result<String> {
        if subject.is_empty() {
            return Err(crate::internal_error!("Token subject cannot be empty"));
        }

        let iat = now.timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            token_type: class,
            iat,
            exp: iat + self.ttl(class).num_seconds(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, self.key.encoding())
            .map_err(|e| GatewayError::internal_with_source("Token generation failed", e))
    }

    /// Verify signature, structure and expiry against the current time
    pub fn parse(&self, token: &str) -> Result<TokenClaims> {
        self.parse_at(token, Utc::now())
    }

    /// Verify signature, structure and expiry against `now`
    pub fn parse_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims> {
        let token_data: TokenData<TokenClaims> =
            decode(token, self.key.decoding(), &self.validation)?;
        let claims = token_data.claims;

        if claims.sub.is_empty() {
            return Err(AuthError::invalid("missing subject").into());
        }
        if claims.exp < claims.iat {
            return Err(AuthError::invalid("expiry precedes issue time").into());
        }
        if claims.is_expired_at(now) {
            ldebug!(
                "system",
                LogStage::Authentication,
                LogComponent::TokenCodec,
                "token_expired",
                &format!("令牌已过期: {}", token_preview(token))
            );
            return Err(AuthError::ExpiredToken.into());
        }

        Ok(claims)
    }

    /// Never fails; false on any parse failure
    #[must_use]
    pub fn is_valid(&self, token: &str) -> bool {
        self.parse(token).is_ok()
    }

    /// Expiry timestamp of a verified token
    pub fn expires_at(&self, token: &str) -> Result<DateTime<Utc>> {
        self.parse(token)?
            .expires_at()
            .ok_or_else(|| AuthError::invalid("expiry out of range").into())
    }
}
