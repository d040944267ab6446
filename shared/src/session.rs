//! Session tokens: HS256 JWTs with a fixed 24 hour lifetime.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::Role;

/// Lifetime of every issued token.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Credential record id
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens with the process-wide secret.
#[derive(Clone)]
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn issue(&self, sub: &str, email: &str, role: &Role) -> Result<String, ApiError> {
        self.issue_at(sub, email, role, Utc::now())
    }

    /// Issue a token as of `now`; expiry is exactly [`SESSION_TTL_SECS`] later.
    pub fn issue_at(
        &self,
        sub: &str,
        email: &str,
        role: &Role,
        now: DateTime<Utc>,
    ) -> Result<String, ApiError> {
        let iat = now.timestamp();
        let claims = SessionClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            role: role.clone(),
            iat,
            exp: iat + SESSION_TTL_SECS,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, ApiError> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("Rejected session token: {}", e);
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let signer = SessionSigner::new("test-secret");
        let token = signer.issue("cred-1", "a@x.com", &Role::Student).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, "cred-1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECS);
    }

    #[test]
    fn test_expiry_is_24_hours_after_issuance() {
        let signer = SessionSigner::new("test-secret");
        let now = Utc::now();
        let token = signer.issue_at("cred-1", "a@x.com", &Role::Admin, now).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + chrono::Duration::hours(24)).timestamp());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = SessionSigner::new("secret-a")
            .issue("cred-1", "a@x.com", &Role::Admin)
            .unwrap();
        let result = SessionSigner::new("secret-b").verify(&token);
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = SessionSigner::new("test-secret");
        // Issued 25 hours ago: expired an hour ago, well past the leeway.
        let issued = Utc::now() - chrono::Duration::hours(25);
        let token = signer.issue_at("cred-1", "a@x.com", &Role::Admin, issued).unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn test_unknown_role_survives_round_trip() {
        let signer = SessionSigner::new("test-secret");
        let role = Role::Other("tutor".to_string());
        let token = signer.issue("cred-9", "t@x.com", &role).unwrap();
        assert_eq!(signer.verify(&token).unwrap().role, role);
    }
}
