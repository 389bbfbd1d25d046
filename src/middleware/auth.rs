use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage};

use super::RequestContext;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::utils::jwt::{RejectionReason, TokenValidator};

/// Authentication boundary for protected routes, used via
/// `actix_web::middleware::from_fn(authenticate)`.
///
/// Validates the bearer token and attaches the resulting claims to the
/// request's [`RequestContext`]. Rejected requests are answered here and
/// never reach the handler.
pub async fn authenticate(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse, Error> {
    match identify(&req) {
        Ok(context) => {
            req.extensions_mut().insert(context);
            next.call(req).await.map(ServiceResponse::map_into_boxed_body)
        }
        Err(err) => Ok(req.error_response(err)),
    }
}

fn identify(req: &ServiceRequest) -> Result<RequestContext, AppError> {
    let validator = req
        .app_data::<web::Data<TokenValidator>>()
        .ok_or_else(|| AppError::internal("TokenValidator missing from app data"))?;
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::internal("AppConfig missing from app data"))?;

    let header = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| RejectionReason::MalformedAuth)?),
    };

    let claims = validator.validate(header).map_err(|reason| {
        log::warn!("rejected {} {}: {}", req.method(), req.path(), reason);
        reason
    })?;

    RequestContext::new(config.clone().into_inner()).attach(claims)
}
