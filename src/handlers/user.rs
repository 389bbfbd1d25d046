use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::middleware::RequestContext;
use crate::models::manager::ManagerUpdate;
use crate::services::ManagerService;

pub async fn get_user_profile(
    context: RequestContext,
    service: web::Data<ManagerService>,
) -> Result<HttpResponse, AppError> {
    let profile = service.profile(context.claims()?).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn update_user_profile(
    context: RequestContext,
    service: web::Data<ManagerService>,
    update: web::Json<ManagerUpdate>,
) -> Result<HttpResponse, AppError> {
    let profile = service
        .update_profile(context.claims()?, update.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
