use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};

/// Session token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, is_admin: bool, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id,
            email: email.to_string(),
            is_admin,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no token supplied")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Issues and verifies HS256 session tokens with a process-wide secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        let hours = security.jwt_expiry_hours.clamp(1, MAX_JWT_EXPIRY_HOURS);
        let hours = i64::try_from(hours).unwrap_or(24);
        Self::new(&security.jwt_secret, Duration::hours(hours))
    }

    /// Token lifetime in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, user_id: Uuid, email: &str, is_admin: bool) -> Result<String, TokenError> {
        self.issue_at(user_id, email, is_admin, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        is_admin: bool,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, email, is_admin, issued_at, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Check signature and expiry; any failure is `InvalidToken`
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::hours(24))
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let tokens = service();
        let id = Uuid::new_v4();
        let token = tokens.issue(id, "clement@example.com", true).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "clement@example.com");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_is_valid_just_before_expiry() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(24) + Duration::minutes(1);
        let token = tokens.issue_at(Uuid::new_v4(), "a@b.io", false, issued_at).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(24) - Duration::seconds(5);
        let token = tokens.issue_at(Uuid::new_v4(), "a@b.io", false, issued_at).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn configured_lifetime_stays_in_range() {
        let mut config = crate::config::AppConfig::for_tests("test-secret");
        config.security.jwt_expiry_hours = u64::MAX;
        let tokens = TokenService::from_config(&config.security);
        assert_eq!(tokens.ttl_secs(), 8760 * 3600);

        config.security.jwt_expiry_hours = 0;
        let tokens = TokenService::from_config(&config.security);
        assert_eq!(tokens.ttl_secs(), 3600);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let other = TokenService::new("another-secret", Duration::hours(24));
        let token = other.issue(Uuid::new_v4(), "a@b.io", false).unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(service().verify("not.a.jwt"), Err(TokenError::InvalidToken(_))));
    }
}
