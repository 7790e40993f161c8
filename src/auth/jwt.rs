//! JWT Token Handler
//! Mission: Issue and verify the stateless 90-day session token

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Fixed session lifetime.
pub const TOKEN_LIFETIME_DAYS: i64 = 90;

/// Verification failures. Anything that is not a clean expiry is `InvalidToken`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature or structure is invalid")]
    InvalidToken,
    #[error("token has expired")]
    Expired,
}

/// A freshly signed token and its absolute expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::days(TOKEN_LIFETIME_DAYS),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Generate a token for a user, expiring 90 days from now
    pub fn generate_token(&self, user_id: Uuid) -> Result<IssuedToken> {
        self.generate_token_at(user_id, Utc::now())
    }

    /// Generate a token as if issued at `now`
    pub fn generate_token_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .context("Invalid timestamp")?;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        debug!(
            "Generating JWT for user {}, expires at {}",
            user_id,
            expires_at.to_rfc3339()
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token and return the user id it was issued for
    pub fn validate_token(&self, token: &str) -> Result<Uuid, TokenError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate a token against the clock reading `now`
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        // Expiry is checked below against `now` with zero leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let decoded = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Rejected JWT: {}", e);
            TokenError::InvalidToken
        })?;

        if now.timestamp() > decoded.claims.exp {
            debug!("Rejected JWT for {}: expired", decoded.claims.sub);
            return Err(TokenError::Expired);
        }

        let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| TokenError::InvalidToken)?;

        debug!("Validated JWT for user {}", user_id);

        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> JwtHandler {
        JwtHandler::new("test-secret-key-12345")
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let handler = handler();
        let user_id = Uuid::new_v4();

        let issued = handler.generate_token(user_id).unwrap();
        assert!(!issued.token.is_empty());

        let validated = handler.validate_token(&issued.token).unwrap();
        assert_eq!(validated, user_id);
    }

    #[test]
    fn test_expiry_is_ninety_days_after_issuance() {
        let handler = handler();
        let issued_at = Utc::now();
        let issued = handler.generate_token_at(Uuid::new_v4(), issued_at).unwrap();

        assert_eq!(
            issued.expires_at.timestamp(),
            (issued_at + Duration::days(90)).timestamp()
        );
    }

    #[test]
    fn test_valid_up_to_boundary_then_expired() {
        let handler = handler();
        let user_id = Uuid::new_v4();
        let issued_at = Utc::now() - Duration::days(200);
        let issued = handler.generate_token_at(user_id, issued_at).unwrap();

        let just_before = issued_at + Duration::days(90) - Duration::seconds(1);
        assert_eq!(
            handler.validate_token_at(&issued.token, just_before),
            Ok(user_id)
        );

        let at_boundary = issued_at + Duration::days(90);
        assert_eq!(
            handler.validate_token_at(&issued.token, at_boundary),
            Ok(user_id)
        );

        let past_boundary = issued_at + Duration::days(90) + Duration::seconds(1);
        assert_eq!(
            handler.validate_token_at(&issued.token, past_boundary),
            Err(TokenError::Expired)
        );

        // Wall-clock validation of an old token
        assert_eq!(
            handler.validate_token(&issued.token),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_invalid_token_rejected() {
        let handler = handler();

        assert_eq!(
            handler.validate_token("invalid.token.here"),
            Err(TokenError::InvalidToken)
        );
        assert_eq!(handler.validate_token(""), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1");
        let handler2 = JwtHandler::new("secret2");

        let issued = handler1.generate_token(Uuid::new_v4()).unwrap();

        assert_eq!(
            handler2.validate_token(&issued.token),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_expired_token_with_foreign_key_is_invalid_not_expired() {
        let forged = JwtHandler::new("attacker-secret")
            .generate_token_at(Uuid::new_v4(), Utc::now() - Duration::days(365))
            .unwrap();

        assert_eq!(
            handler().validate_token(&forged.token),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let handler = handler();
        let victim = handler.generate_token(Uuid::new_v4()).unwrap();
        let attacker = handler.generate_token(Uuid::new_v4()).unwrap();

        // Victim's payload under the attacker's signature
        let victim_parts: Vec<&str> = victim.token.split('.').collect();
        let attacker_parts: Vec<&str> = attacker.token.split('.').collect();
        let spliced = format!(
            "{}.{}.{}",
            victim_parts[0], victim_parts[1], attacker_parts[2]
        );

        assert_eq!(
            handler.validate_token(&spliced),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let secret = "test-secret-key-12345";
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            JwtHandler::new(secret).validate_token(&token),
            Err(TokenError::InvalidToken)
        );
    }
}
