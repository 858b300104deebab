/// Routes that require an authenticated caller

use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::RequestIdentity;
use crate::error::AppError;
use crate::users::UserStore;

#[derive(Serialize)]
pub struct IdentityResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// GET /me
///
/// Echoes the identity decoded from the caller's access token.
pub async fn current_identity(identity: RequestIdentity) -> HttpResponse {
    let claims = identity.claims();
    HttpResponse::Ok().json(IdentityResponse {
        id: claims.sub.clone(),
        name: claims.name.clone(),
        email: claims.email.clone(),
        issued_at: claims.iat,
        expires_at: claims.exp,
    })
}

/// GET /users/{id}
///
/// # Errors
/// - 401: access token subject is not a user id
/// - 404: no user with that id
pub async fn get_user(
    path: web::Path<Uuid>,
    users: web::Data<dyn UserStore>,
    identity: RequestIdentity,
) -> Result<HttpResponse, AppError> {
    let caller = identity.user_id()?;
    let id = path.into_inner();
    let user = users
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    tracing::debug!(requested_by = %caller, user_id = %id, "User record served");
    Ok(HttpResponse::Ok().json(user))
}
