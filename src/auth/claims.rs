/// JWT Claims structures
///
/// Two shapes are issued: [`AccessClaims`] carry the caller's identity for a
/// short window, [`RefreshClaims`] carry only timestamps. Both reject unknown
/// fields so one kind can never be decoded as the other.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AccessClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Display name
    pub name: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Create claims valid for `expiry_seconds` from now
    pub fn new(user_id: Uuid, name: &str, email: &str, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    /// Extract user ID from claims
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| {
            tracing::warn!(sub = %self.sub, "Access token subject is not a UUID");
            AppError::Auth(AuthError::TokenInvalid)
        })
    }
}

/// Claims for refresh tokens; no identity payload
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iat: now,
            exp: now + expiry_seconds,
        }
    }
}

/// Claim sets that carry an expiry
pub trait Expiring {
    fn expires_at(&self) -> i64;

    /// A token is dead from its `exp` second onwards
    fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at() <= now
    }
}

impl Expiring for AccessClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl Expiring for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}
