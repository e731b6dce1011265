//! Feedback-link token signing and verification.
//!
//! Each checked-in visitor receives a one-time link carrying a short-lived
//! signed token. The signature proves the link came from us; the `jti` is
//! burned on submission so a link works exactly once.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

/// Claims carried by a feedback-link token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackClaims {
    /// The visitor the link was issued for.
    pub sub: Uuid,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// One-time token identifier, burned on use.
    pub jti: Uuid,
}

/// Creates and validates signed feedback-link tokens.
#[derive(Clone)]
pub struct FeedbackTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

impl FeedbackTokenSigner {
    /// Create a signer from the shared HMAC secret.
    pub fn new(secret: &str, ttl_hours: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours: ttl_hours as i64,
        }
    }

    /// Issue a token for a visitor.
    pub fn issue(&self, visitor_id: Uuid, now: DateTime<Utc>) -> AppResult<String> {
        let claims = FeedbackClaims {
            sub: visitor_id,
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode feedback token: {e}")))
    }

    /// Verify a token's signature and expiry.
    pub fn verify(&self, token: &str) -> AppResult<FeedbackClaims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<FeedbackClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::unauthorized(format!("Invalid feedback token: {e}")))
    }

    /// Token lifetime in hours, for email copy.
    pub fn ttl_hours(&self) -> i64 {
        self.ttl_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;

    #[test]
    fn test_issue_verify_roundtrip() {
        let signer = FeedbackTokenSigner::new("test-secret", 24);
        let visitor_id = Uuid::new_v4();

        let token = signer.issue(visitor_id, Utc::now()).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, visitor_id);
    }

    #[test]
    fn test_distinct_jti_per_issue() {
        let signer = FeedbackTokenSigner::new("test-secret", 24);
        let visitor_id = Uuid::new_v4();
        let now = Utc::now();

        let a = signer.verify(&signer.issue(visitor_id, now).unwrap()).unwrap();
        let b = signer.verify(&signer.issue(visitor_id, now).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = FeedbackTokenSigner::new("test-secret", 24);
        let issued_long_ago = Utc::now() - Duration::hours(48);

        let token = signer.issue(Uuid::new_v4(), issued_long_ago).unwrap();
        let err = signer.verify(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = FeedbackTokenSigner::new("test-secret", 24);
        let other = FeedbackTokenSigner::new("other-secret", 24);

        let token = signer.issue(Uuid::new_v4(), Utc::now()).unwrap();
        assert!(other.verify(&token).is_err());
    }
}
