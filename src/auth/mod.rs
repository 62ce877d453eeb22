use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

pub mod cookies;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id.
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Malformed,
    MissingSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::Malformed => write!(f, "Invalid token format"),
            TokenError::MissingSecret => write!(f, "JWT secret not configured"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issue a signed token for the given user.
pub fn generate_token(user_id: Uuid, security: &SecurityConfig) -> Result<String, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let claims = Claims::new(user_id, security.jwt_expiry_hours);
    let key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &key).map_err(|_| TokenError::Malformed)
}

/// Verify signature and expiry, returning the embedded claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            cors_origins: vec![],
            secure_cookies: false,
        }
    }

    #[test]
    fn token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, &security()).unwrap();
        let claims = decode_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let key = EncodingKey::from_secret(b"test-secret");
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert_eq!(decode_token(&token, "test-secret"), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert_eq!(
            decode_token("not.a.token", "test-secret"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let token = generate_token(Uuid::new_v4(), &security()).unwrap();
        assert_eq!(decode_token(&token, "other"), Err(TokenError::Malformed));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let mut sec = security();
        sec.jwt_secret = String::new();
        assert_eq!(
            generate_token(Uuid::new_v4(), &sec),
            Err(TokenError::MissingSecret)
        );
    }
}
