use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::RequestContext;
use crate::models::department::{DepartmentQueryParams, DepartmentUpdate, NewDepartment};
use crate::services::DepartmentService;

// An id that cannot be a department can never be found.
fn parse_department_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Department not found".to_string()))
}

pub async fn create_department(
    context: RequestContext,
    service: web::Data<DepartmentService>,
    new_department: web::Json<NewDepartment>,
) -> Result<HttpResponse, AppError> {
    let department = service
        .create(context.claims()?, new_department.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(department))
}

pub async fn get_departments(
    context: RequestContext,
    service: web::Data<DepartmentService>,
    query: web::Query<DepartmentQueryParams>,
) -> Result<HttpResponse, AppError> {
    let filter = query
        .into_inner()
        .into_filter(context.config().default_page_limit);
    let departments = service.list(context.claims()?, &filter).await?;
    Ok(HttpResponse::Ok().json(departments))
}

pub async fn update_department(
    context: RequestContext,
    service: web::Data<DepartmentService>,
    department_id: web::Path<String>,
    update: web::Json<DepartmentUpdate>,
) -> Result<HttpResponse, AppError> {
    let department_id = parse_department_id(&department_id)?;
    let department = service
        .update(context.claims()?, department_id, update.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(department))
}

pub async fn delete_department(
    context: RequestContext,
    service: web::Data<DepartmentService>,
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let department_id = parse_department_id(&department_id)?;
    service.delete(context.claims()?, department_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deleted successfully",
    })))
}
