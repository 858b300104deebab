/// JWT Token Generation and Validation
///
/// [`TokenCodec`] signs and verifies both token kinds with HS256. Secrets and
/// lifetimes are handed over at construction; nothing is read from the
/// environment here.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::claims::{AccessClaims, Expiring, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const RECOMMENDED_SECRET_LENGTH: usize = 32;

pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenCodec {
    /// Build a codec from validated settings
    ///
    /// # Errors
    /// Returns a configuration error when a secret is missing or a lifetime
    /// is not positive. Callers treat this as fatal.
    pub fn new(config: &JwtSettings) -> Result<Self, AppError> {
        config.validate()?;

        for (name, secret) in [
            ("jwt.access_secret", config.access_secret.as_str()),
            ("jwt.refresh_secret", config.refresh_secret()),
        ] {
            if secret.len() < RECOMMENDED_SECRET_LENGTH {
                tracing::warn!(setting = name, "Signing secret is shorter than 32 bytes");
            }
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is enforced to the second
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret().as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret().as_bytes()),
            validation,
            access_ttl: config.access_token_expiry,
            refresh_ttl: config.refresh_token_expiry,
        })
    }

    /// Access token lifetime in seconds
    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_ttl(&self) -> i64 {
        self.refresh_ttl
    }

    pub fn issue_access(&self, claims: &AccessClaims) -> Result<String, AppError> {
        sign(claims, &self.access_encoding, "access")
    }

    pub fn issue_refresh(&self, claims: &RefreshClaims) -> Result<String, AppError> {
        sign(claims, &self.refresh_encoding, "refresh")
    }

    /// Verify an access token and return its claims
    ///
    /// # Errors
    /// `TokenInvalid` for every failure; the reason is only logged.
    pub fn parse_access(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.verify(token, &self.access_decoding, "access")
    }

    /// Verify a refresh token and return its claims
    ///
    /// # Errors
    /// `TokenInvalid` for every failure; the reason is only logged.
    pub fn parse_refresh(&self, token: &str) -> Result<RefreshClaims, AppError> {
        self.verify(token, &self.refresh_decoding, "refresh")
    }

    fn verify<T>(&self, token: &str, key: &DecodingKey, kind: &'static str) -> Result<T, AppError>
    where
        T: DeserializeOwned + Expiring,
    {
        let data = decode::<T>(token, key, &self.validation).map_err(|e| {
            tracing::debug!(token_kind = kind, reason = ?e.kind(), "Token rejected");
            AuthError::TokenInvalid
        })?;

        // jsonwebtoken accepts exp == now; the token is already dead at that second
        let now = chrono::Utc::now().timestamp();
        if data.claims.is_expired_at(now) {
            tracing::debug!(token_kind = kind, reason = "expired", "Token rejected");
            return Err(AuthError::TokenInvalid.into());
        }

        Ok(data.claims)
    }
}

fn sign<T: Serialize>(claims: &T, key: &EncodingKey, kind: &'static str) -> Result<String, AppError> {
    encode(&Header::new(SIGNING_ALGORITHM), claims, key).map_err(|e| {
        tracing::error!(token_kind = kind, error = %e, "Token signing failed");
        AppError::Auth(AuthError::Signing)
    })
}
