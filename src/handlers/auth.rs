use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::auth::{AuthAction, Credential};
use crate::services::AuthService;

/// `POST /v1/auth`: registers (`"action": "create"`) or logs in.
pub async fn auth_handler(
    service: web::Data<AuthService>,
    credential: web::Json<Credential>,
) -> Result<HttpResponse, AppError> {
    let outcome = service.authenticate(credential.into_inner()).await?;
    Ok(match outcome.action {
        AuthAction::Create => HttpResponse::Created().json(outcome.response),
        AuthAction::Login => HttpResponse::Ok().json(outcome.response),
    })
}
