use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::{info, warn};
use std::rc::Rc;
use std::time::Instant;

use crate::auth::RequestIdentity;

/// 요청 로깅 미들웨어
/// 메서드, 경로, 상태 코드, 처리 시간, 인증된 사용자를 기록합니다.
/// Authorization 헤더는 절대 기록하지 않습니다.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequestLoggerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();

        let service = self.service.clone();

        Box::pin(async move {
            let res = service.call(req).await?;

            let elapsed = start_time.elapsed().as_millis();
            let status = res.status().as_u16();
            // 인증 게이트가 붙인 신원 (공개 경로는 없음)
            let user = res
                .request()
                .extensions()
                .get::<RequestIdentity>()
                .map(|identity| identity.subject().to_string())
                .unwrap_or_else(|| "-".to_string());

            if res.status().is_client_error() || res.status().is_server_error() {
                warn!("{} {} -> {} user={} ({}ms)", method, path, status, user, elapsed);
            } else {
                info!("{} {} -> {} user={} ({}ms)", method, path, status, user, elapsed);
            }

            Ok(res)
        })
    }
}
