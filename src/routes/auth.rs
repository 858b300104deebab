/// Authentication Routes
///
/// Registration, login and the refresh exchange. All three are public; the
/// refresh endpoint verifies its own token instead of an access token.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{
    exchange_refresh_token, hash_password, issue_token_pair, verify_password, TokenCodec,
};
use crate::configuration::PasswordSettings;
use crate::error::{AppError, AuthError, ErrorContext};
use crate::users::{NewUser, UserRecord, UserStore};
use crate::validators::{is_valid_email, is_valid_name, is_valid_password};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh exchange request; `id` names the account to reissue for
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub id: Uuid,
    pub token: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserRecord,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserRecord,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /register
///
/// # Errors
/// - 400: invalid name, email or password
/// - 409: email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    users: web::Data<dyn UserStore>,
    password: web::Data<PasswordSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");
    let RegisterRequest {
        name,
        email,
        password: secret,
    } = form.into_inner();

    let name = is_valid_name(&name)?;
    let email = is_valid_email(&email)?;
    is_valid_password(&secret)?;

    let cost = password.cost;
    let password_hash = web::block(move || hash_password(&secret, cost)).await??;

    let user = users
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| context.record(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered"
    );

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User created!".to_string(),
        user,
    }))
}

/// POST /login
///
/// An unknown email and a wrong password produce the same 401. The email is
/// only trimmed here; format rules belong to registration.
///
/// # Errors
/// - 400: malformed body
/// - 401: invalid credentials
pub async fn login(
    form: web::Json<LoginRequest>,
    users: web::Data<dyn UserStore>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let LoginRequest { email, password } = form.into_inner();
    let email = email.trim();

    let user = match users.find_user_by_email(email).await? {
        Some(user) => user,
        None => {
            return Err(context.record(AuthError::CredentialMismatch.into()));
        }
    };

    let stored_hash = user.password_hash.clone();
    let verified = web::block(move || verify_password(&password, &stored_hash)).await?;
    if !verified {
        let context = context.with_user_id(user.id.to_string());
        return Err(context.record(AuthError::CredentialMismatch.into()));
    }

    let pair = issue_token_pair(&codec, &user)?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login Success".to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user,
    }))
}

/// POST /refresh
///
/// # Errors
/// - 400: malformed body (checked before any token logic)
/// - 401: refresh token fails verification
/// - 404: no user with the given id
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    users: web::Data<dyn UserStore>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh").with_user_id(form.id.to_string());

    let pair = exchange_refresh_token(&codec, users.get_ref(), form.id, &form.token)
        .await
        .map_err(|e| context.record(e))?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        message: "Token Refreshed".to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}
