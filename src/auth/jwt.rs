//! JWT token validation
//!
//! HS256 tokens issued by the identity provider. Cropcast validates the
//! signature and expiry and reads the user id from the claims; it never
//! issues tokens itself outside of dev tooling and tests.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::CropcastError;

/// JWT claims for an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (subject)
    pub sub: String,
    /// User identifier (email or username), for logging
    #[serde(default)]
    pub identifier: String,
    /// Expiry (unix seconds)
    pub exp: u64,
    /// Issued at (unix seconds)
    pub iat: u64,
}

/// Result of token verification
#[derive(Debug)]
pub struct TokenValidationResult {
    pub valid: bool,
    pub claims: Option<Claims>,
    pub error: Option<String>,
}

/// Validates (and, for dev tooling, mints) HS256 tokens
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl JwtValidator {
    pub fn new(secret: String, expiry_seconds: u64) -> Self {
        Self {
            secret,
            expiry_seconds,
        }
    }

    /// Generate a token for the given user. Used by dev tooling and tests;
    /// production tokens come from the identity provider.
    pub fn generate_token(&self, user_id: &str, identifier: &str) -> Result<String, CropcastError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CropcastError::Auth(format!("Clock error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: user_id.to_string(),
            identifier: identifier.to_string(),
            exp: now + self.expiry_seconds,
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CropcastError::Auth(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token and extract its claims
    pub fn verify_token(&self, token: &str) -> TokenValidationResult {
        let validation = Validation::default();

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => TokenValidationResult {
                valid: true,
                claims: Some(data.claims),
                error: None,
            },
            Err(e) => TokenValidationResult {
                valid: false,
                claims: None,
                error: Some(format!("Invalid token: {}", e)),
            },
        }
    }
}

/// Extract a Bearer token from an Authorization header value
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    header.and_then(|h| h.strip_prefix("Bearer ")).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> JwtValidator {
        JwtValidator::new("test-secret".to_string(), 3600)
    }

    #[test]
    fn test_generate_and_verify_roundtrip() {
        let jwt = validator();
        let token = jwt.generate_token("user-1", "farmer@example.com").unwrap();

        let result = jwt.verify_token(&token);
        assert!(result.valid);
        let claims = result.claims.unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.identifier, "farmer@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = validator().generate_token("user-1", "a@b.c").unwrap();
        let other = JwtValidator::new("different-secret".to_string(), 3600);

        let result = other.verify_token(&token);
        assert!(!result.valid);
        assert!(result.claims.is_none());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validator().verify_token("not-a-jwt");
        assert!(!result.valid);
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(
            extract_token_from_header(Some("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_token_from_header(Some("Basic abc")), None);
        assert_eq!(extract_token_from_header(Some("Bearer ")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
