use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::configuration::PasswordSettings;
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::middleware::{AuthGate, PublicRoutes};
use crate::routes;
use crate::users::UserStore;

/// Malformed JSON bodies become 400 `ErrorResponse`s before any handler logic
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
    })
}

pub fn run(
    listener: TcpListener,
    users: Arc<dyn UserStore>,
    codec: TokenCodec,
    password: PasswordSettings,
    public_routes: PublicRoutes,
) -> Result<Server, std::io::Error> {
    let users: web::Data<dyn UserStore> = web::Data::from(users);
    let codec = web::Data::new(codec);
    let password = web::Data::new(password);

    let server = HttpServer::new(move || {
        App::new()
            // 바깥쪽부터: 요청 로깅 -> 인증 게이트 -> 라우트
            .wrap(AuthGate::new(codec.clone().into_inner(), public_routes.clone()))
            .wrap(RequestLogger)
            .app_data(json_config())
            .app_data(users.clone())
            .app_data(codec.clone())
            .app_data(password.clone())
            .configure(routes::configure)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
