//! HS256 access tokens
//!
//! Tokens are minted by the account service with the shared `JWT_SECRET`; this service
//! only validates them. `issue` exists for tooling and tests.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tubely_core::constants::JWT_ISSUER;
use tubely_core::AppError;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String, // user_id
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: JWT_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate signature, issuer and expiry, and return the subject as a user id.
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-123456";

    #[test]
    fn test_issue_then_validate() {
        let jwt = JwtService::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = jwt.issue(user_id, Duration::from_secs(60)).unwrap();
        assert_eq!(jwt.validate(&token).unwrap(), user_id);
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = JwtService::new(SECRET)
            .issue(Uuid::new_v4(), Duration::from_secs(60))
            .unwrap();
        let other = JwtService::new("another-secret-that-is-long-enough-000");
        assert!(matches!(other.validate(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_rejects_expired_and_garbage() {
        let jwt = JwtService::new(SECRET);
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: JWT_ISSUER.to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let expired = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(jwt.validate(&expired).is_err());
        assert!(jwt.validate("not.a.token").is_err());
    }

    #[test]
    fn test_rejects_wrong_issuer() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(JwtService::new(SECRET).validate(&token).is_err());
    }
}
