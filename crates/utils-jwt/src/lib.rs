//! Signed bearer tokens for the HTTP API: HS256 JWTs carrying the user's
//! email as subject.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issued tokens live for a day unless configured otherwise.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("JWT encode: {0}")]
    Encode(String),
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the user's email.
    pub sub: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Stateless issuer/verifier around a shared secret. Verification checks
/// signature and expiry only; whether the subject still exists is the
/// caller's concern.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: u64,
}

impl JwtService {
    pub fn new(secret: &str, lifetime_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    pub fn with_default_lifetime(secret: &str) -> Self {
        Self::new(secret, DEFAULT_TOKEN_LIFETIME_SECS)
    }

    pub fn issue(&self, email: &str) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_string(),
            iat: now,
            exp: now + self.lifetime_secs as i64,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret-at-least-32-bytes-long!!", 3600)
    }

    #[test]
    fn round_trip_preserves_subject_and_lifetime() {
        let svc = service();
        let token = svc.issue("ana@example.com").unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, "ana@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = service().issue("ana@example.com").unwrap();
        let other = JwtService::new("a-completely-different-signing-key!!", 3600);
        assert!(matches!(other.verify(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let mut token = svc.issue("ana@example.com").unwrap();
        token.push('x');
        assert!(matches!(svc.verify(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let svc = service();
        let past = Utc::now().timestamp() - 7200;
        let claims = Claims {
            sub: "ana@example.com".to_string(),
            iat: past,
            exp: past + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-at-least-32-bytes-long!!".as_bytes()),
        )
        .unwrap();

        assert!(matches!(svc.verify(&token), Err(JwtError::Expired)));
    }
}
