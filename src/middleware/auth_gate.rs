/// Authentication Gate Middleware
///
/// Wraps the whole application. Requests under a public path prefix pass
/// straight through. Every other request must carry
/// `Authorization: Bearer <access token>`; on success the decoded
/// [`RequestIdentity`] is stored in the request extensions, on failure the
/// request is answered with 401 and the inner service is never called.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{RequestIdentity, TokenCodec};
use crate::error::{AppError, AuthError};

/// Path prefixes exempt from authentication
///
/// A prefix matches the path itself and anything below it, so `/login`
/// covers `/login` and `/login/sso` but not `/loginx`.
#[derive(Debug, Clone, Default)]
pub struct PublicRoutes {
    prefixes: Vec<String>,
}

impl PublicRoutes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.into().trim_end_matches('/').to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .map_or(false, |rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

pub struct AuthGate {
    codec: Arc<TokenCodec>,
    public_routes: PublicRoutes,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>, public_routes: PublicRoutes) -> Self {
        Self {
            codec,
            public_routes,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            public_routes: self.public_routes.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    public_routes: PublicRoutes,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.public_routes.is_public(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        match authenticate(&req, &self.codec) {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.subject(), "Access token verified");
                req.extensions_mut().insert(identity);

                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(err) => {
                tracing::warn!(path = %req.path(), error = %err, "Request rejected by auth gate");
                let res = req.error_response(err).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

fn authenticate(req: &ServiceRequest, codec: &TokenCodec) -> Result<RequestIdentity, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let token = value
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or(AuthError::TokenInvalid)?;

    let claims = codec.parse_access(token)?;
    Ok(RequestIdentity::new(claims))
}

/// Token part of a `Bearer` credential; the scheme is case-insensitive
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
