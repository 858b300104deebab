use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use uuid::Uuid;

use crate::auth::claims::AccessClaims;
use crate::error::{AppError, AuthError};

/// Identity of the caller, decoded from a verified access token
///
/// The auth gate stores it in the request extensions; handlers take it as
/// an argument. Extraction fails with 401 if the gate did not run for the
/// route (public paths carry no identity).
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    claims: AccessClaims,
}

impl RequestIdentity {
    pub fn new(claims: AccessClaims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &AccessClaims {
        &self.claims
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.claims.user_id()
    }
}

impl FromRequest for RequestIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<RequestIdentity>()
                .cloned()
                .ok_or(AppError::Auth(AuthError::MissingToken)),
        )
    }
}
