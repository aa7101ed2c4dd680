//! Bearer Tokens

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AuthError;

/// Identity carried by a login token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Issues and verifies HS256 tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service; the secret must not be blank
    pub fn new(secret: &str, ttl_minutes: i64) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::minutes(ttl_minutes),
        })
    }

    /// Issue a token for an account, valid from now
    pub fn issue(&self, id: i64, email: &str, name: &str) -> Result<String, AuthError> {
        self.issue_at(id, email, name, Utc::now())
    }

    /// Issue a token as if it were `issued_at`
    pub fn issue_at(
        &self,
        id: i64,
        email: &str,
        name: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            id,
            email: email.to_string(),
            name: name.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let service = TokenService::new("unit-test-secret", 60).unwrap();
        let token = service.issue(7, "andi@example.com", "Andi").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.email, "andi@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("unit-test-secret", 60).unwrap();
        let issued = Utc::now() - Duration::hours(3);
        let token = service.issue_at(7, "andi@example.com", "Andi", issued).unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new("first-secret", 60).unwrap();
        let verifier = TokenService::new("second-secret", 60).unwrap();
        let token = issuer.issue(1, "a@example.com", "A").unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let service = TokenService::new("unit-test-secret", 60).unwrap();
        assert!(service.verify("not.a.token").is_err());
    }

    #[test]
    fn test_blank_secret() {
        assert!(matches!(
            TokenService::new("  ", 60),
            Err(AuthError::MissingSecret)
        ));
    }
}
