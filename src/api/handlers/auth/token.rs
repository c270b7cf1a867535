//! Signed identity assertions (HS256 bearer tokens).

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cli::globals::Config;

use super::types::Role;

pub(crate) const TOKEN_TTL_DAYS: i64 = 7;

/// Claims embedded in a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Process-wide signing/verification keys, derived once from configuration.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let secret = config.token_secret().expose_secret();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token valid for seven days from now.
    pub fn issue(&self, id: Uuid, email: &str, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).context("failed to sign token")
    }

    /// Verify a token. Signature, structure, and expiry must all check out;
    /// every failure cause collapses to `None`.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::new(&Config::new(Some(secret.to_string())))
    }

    #[test]
    fn test_issue_then_verify_round_trips() -> Result<()> {
        let keys = keys("test-secret");
        let id = Uuid::new_v4();
        let token = keys.issue(id, "alice@example.com", Role::Employee)?;

        let claims = keys.verify(&token).expect("token should verify");
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::Employee);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
        Ok(())
    }

    #[test]
    fn test_expired_token_rejected() -> Result<()> {
        let keys = keys("test-secret");
        let now = Utc::now();
        // Expired well past the default validation leeway.
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            role: Role::Employee,
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding)?;
        assert!(keys.verify(&token).is_none());
        Ok(())
    }

    #[test]
    fn test_wrong_secret_rejected() -> Result<()> {
        let signer = keys("one-secret");
        let verifier = keys("another-secret");
        let token = signer.issue(Uuid::new_v4(), "alice@example.com", Role::Admin)?;
        assert!(verifier.verify(&token).is_none());
        Ok(())
    }

    #[test]
    fn test_malformed_token_rejected() {
        let keys = keys("test-secret");
        assert!(keys.verify("not-a-token").is_none());
        assert!(keys.verify("").is_none());
        assert!(keys.verify("aaa.bbb.ccc").is_none());
    }
}
