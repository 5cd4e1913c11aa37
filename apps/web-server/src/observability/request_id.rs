//! Request ID middleware - tags every request with a correlation ID.

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request ID in both directions.
const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static CURRENT_REQUEST_ID: String;
}

/// Correlation ID of the request being handled, if any.
pub fn current_request_id() -> Option<String> {
    CURRENT_REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Reuses an incoming `X-Request-ID` or generates one, echoes it on the
/// response and runs the rest of the chain inside a span carrying it.
/// Error bodies built further down read it back via [`current_request_id`].
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestIdService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdService { service }))
    }
}

pub struct RequestIdService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && v.len() <= 128)
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let span = tracing::info_span!("request", request_id = %request_id);
        let fut = {
            let _guard = span.enter();
            self.service.call(req)
        };

        let scoped = CURRENT_REQUEST_ID.scope(request_id.clone(), fut);

        Box::pin(
            async move {
                let mut res = scoped.await?;

                let value = HeaderValue::from_str(&request_id)
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);

                Ok(res)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    async fn echo() -> HttpResponse {
        HttpResponse::Ok().body(current_request_id().unwrap_or_default())
    }

    #[actix_web::test]
    async fn incoming_id_is_reused_and_visible_to_handlers() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(echo)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((REQUEST_ID_HEADER, "abc-123"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "abc-123");
        assert_eq!(test::read_body(resp).await, "abc-123");
    }

    #[actix_web::test]
    async fn missing_id_is_generated() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(echo)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let header = resp.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap().to_string();

        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(test::read_body(resp).await, header.as_bytes());
    }

    #[actix_web::test]
    async fn no_id_outside_a_request() {
        assert!(current_request_id().is_none());
    }
}
