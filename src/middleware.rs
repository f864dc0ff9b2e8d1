//! Response middleware redirecting anonymous users to the sign-in page.

use std::future::{Future, Ready, ready};
use std::pin::Pin;

use actix_web::HttpResponse;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use actix_web::http::header;

/// Turns `401 Unauthorized` responses into a redirect to `/auth/signin`.
///
/// The [`crate::auth::AuthenticatedUser`] extractor rejects anonymous
/// requests with 401; wrapping the page scope with this middleware sends
/// browsers to the sign-in form instead of showing them a bare error.
pub struct RedirectUnauthorized;

impl<S, B> Transform<S, ServiceRequest> for RedirectUnauthorized
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = RedirectUnauthorizedMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RedirectUnauthorizedMiddleware { service }))
    }
}

pub struct RedirectUnauthorizedMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RedirectUnauthorizedMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Keep a handle on the request so extractor failures (which surface
        // as errors, not responses) can still be answered with a redirect.
        let (http_req, payload) = req.into_parts();
        let fut = self
            .service
            .call(ServiceRequest::from_parts(http_req.clone(), payload));

        Box::pin(async move {
            match fut.await {
                Ok(res) if res.status() == StatusCode::UNAUTHORIZED => {
                    let (req, _) = res.into_parts();
                    Ok(ServiceResponse::new(req, signin_redirect()))
                }
                Ok(res) => Ok(res.map_into_left_body()),
                Err(err)
                    if err.as_response_error().status_code() == StatusCode::UNAUTHORIZED =>
                {
                    Ok(ServiceResponse::new(http_req, signin_redirect()))
                }
                Err(err) => Err(err),
            }
        })
    }
}

fn signin_redirect<B>() -> HttpResponse<EitherBody<B>> {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/auth/signin"))
        .finish()
        .map_into_right_body()
}
