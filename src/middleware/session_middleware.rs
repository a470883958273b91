/// Session Authentication Middleware
///
/// Reads the `AuthToken` cookie, runs the session state machine and either
/// forwards the request with an [`AuthenticatedUser`] in its extensions or
/// short-circuits it with a 401 / redirect. A renewed access token rides
/// back on the response as a fresh cookie.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{
    access_token_cookie, AuthOutcome, AuthRequest, IssuedAccessToken, RejectionResponse,
    SessionAuthenticator, ACCESS_TOKEN_COOKIE,
};
use crate::error::ErrorResponse;

/// Identity of the caller, injected for handlers behind the middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Session middleware for the whole application
///
/// Public paths pass straight through; every other request needs a session.
pub struct SessionMiddleware {
    authenticator: Arc<SessionAuthenticator>,
}

impl SessionMiddleware {
    pub fn new(authenticator: Arc<SessionAuthenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            authenticator: self.authenticator.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    authenticator: Arc<SessionAuthenticator>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
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
        let service = self.service.clone();
        let authenticator = self.authenticator.clone();

        Box::pin(async move {
            let path = req.path().to_string();
            let access_token = req
                .cookie(ACCESS_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string());
            let content_type = header_value(&req, header::CONTENT_TYPE);
            let accept = header_value(&req, header::ACCEPT);

            let outcome = authenticator
                .authenticate(&AuthRequest {
                    path: &path,
                    access_token: access_token.as_deref(),
                    content_type: content_type.as_deref(),
                    accept: accept.as_deref(),
                })
                .await;

            match outcome {
                AuthOutcome::Public => service.call(req).await,
                AuthOutcome::Authenticated { subject, renewed } => {
                    tracing::debug!(user_id = %subject, path = %path, "Session validated");
                    req.extensions_mut()
                        .insert(AuthenticatedUser { user_id: subject });

                    let mut res = service.call(req).await?;
                    if let Some(renewed) = renewed {
                        attach_renewed_cookie(&mut res, &renewed);
                    }
                    Ok(res)
                }
                AuthOutcome::Rejected { reason, response } => {
                    let response = match response {
                        RejectionResponse::Unauthorized => unauthorized(),
                        RejectionResponse::Redirect(location) => HttpResponse::SeeOther()
                            .insert_header((header::LOCATION, location))
                            .finish(),
                    };
                    Err(actix_web::error::InternalError::from_response(reason, response).into())
                }
            }
        })
    }
}

fn header_value(req: &ServiceRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn unauthorized() -> HttpResponse {
    let body = ErrorResponse::new(
        uuid::Uuid::new_v4().to_string(),
        "Unauthorized".to_string(),
        "UNAUTHORIZED".to_string(),
        StatusCode::UNAUTHORIZED.as_u16(),
    );
    HttpResponse::Unauthorized().json(body)
}

/// Add the renewed `AuthToken` cookie unless the handler already set one
/// itself (logout clears it, login replaces it).
fn attach_renewed_cookie<B>(res: &mut ServiceResponse<B>, renewed: &IssuedAccessToken) {
    let already_set = res
        .response()
        .cookies()
        .any(|cookie| cookie.name() == ACCESS_TOKEN_COOKIE);
    if already_set {
        return;
    }

    let cookie = access_token_cookie(&renewed.token, renewed.expires_at);
    if let Err(e) = res.response_mut().add_cookie(&cookie) {
        tracing::error!(error = %e, "Failed to attach renewed access token cookie");
    }
}
