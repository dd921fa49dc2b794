//! Session token decoding

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::ShipkitError;

/// Claims carried by a gateway session token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account email)
    #[serde(default)]
    pub sub: Option<String>,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: Option<i64>,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: Option<i64>,

    /// Granted roles
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A decoded session token
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Raw token string
    pub raw: String,

    /// Decoded claims
    pub claims: SessionClaims,
}

impl SessionToken {
    /// Decode a JWT without verifying its signature.
    /// The gateway verifies signatures; the console only reads the claims.
    pub fn from_raw(raw: impl Into<String>) -> Result<Self, ShipkitError> {
        let raw = raw.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let token_data = decode::<SessionClaims>(&raw, &DecodingKey::from_secret(b""), &validation)
            .map_err(|e| ShipkitError::TokenError(format!("Failed to decode token: {}", e)))?;

        Ok(Self {
            raw,
            claims: token_data.claims,
        })
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        is_expired_at(&self.claims, Utc::now().timestamp())
    }

    /// Get expiration time
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .exp
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Get the subject
    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref()
    }
}

/// Whether claims are expired at `now` (Unix seconds). A token without `exp` is expired.
pub fn is_expired_at(claims: &SessionClaims, now: i64) -> bool {
    match claims.exp {
        Some(exp) => exp < now,
        None => true,
    }
}

/// Whether a raw token is expired. Undecodable tokens count as expired.
pub fn is_token_expired(raw: &str) -> bool {
    SessionToken::from_raw(raw)
        .map(|token| token.is_expired())
        .unwrap_or(true)
}
