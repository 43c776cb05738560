//! JWT Token Handler
//! Mission: Issue and verify signed identity tokens

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Token claims: the user id and an expiry. Nothing else goes in the token;
/// name and role are looked up fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// JWT handler for token operations
pub struct JwtHandler {
    secret: String,
    expiration_days: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key. Tokens last 30 days; logout
    /// is a client-side credential discard, there is no revocation.
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expiration_days: 30,
        }
    }

    /// Issue a token for a user id.
    pub fn issue(&self, user_id: &Uuid) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(chrono::Duration::days(self.expiration_days))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration,
        };

        debug!(
            "Issuing JWT for user {}, expires in {}d",
            user_id, self.expiration_days
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to issue JWT")
    }

    /// Verify a token and extract its claims. Fails on bad signature,
    /// malformed payload, or expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }
}
