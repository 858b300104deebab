mod auth;
mod health_check;
mod users;

pub use auth::{login, refresh, register, LoginRequest, RefreshRequest, RegisterRequest};
pub use health_check::health_check;
pub use users::{current_identity, get_user};

use actix_web::web;

/// Registers every route; authentication is applied by the gate wrapping the app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/refresh", web::post().to(refresh))
        .route("/me", web::get().to(current_identity))
        .route("/users/{id}", web::get().to(get_user));
}
