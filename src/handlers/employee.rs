use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::middleware::RequestContext;
use crate::models::employee::{EmployeeQueryParams, EmployeeResponse, EmployeeUpdate, NewEmployee};
use crate::services::EmployeeService;

pub async fn create_employee(
    context: RequestContext,
    service: web::Data<EmployeeService>,
    new_employee: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    let employee = service
        .create(context.claims()?, new_employee.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(EmployeeResponse::from(employee)))
}

pub async fn get_employees(
    context: RequestContext,
    service: web::Data<EmployeeService>,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let filter = query
        .into_inner()
        .into_filter(context.config().default_page_limit);
    let employees = service
        .list(context.claims()?, &filter)
        .await?
        .into_iter()
        .map(EmployeeResponse::from)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(employees))
}

pub async fn update_employee(
    context: RequestContext,
    service: web::Data<EmployeeService>,
    identity_number: web::Path<String>,
    changes: web::Json<EmployeeUpdate>,
) -> Result<HttpResponse, AppError> {
    let employee = service
        .update(context.claims()?, &identity_number, changes.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(EmployeeResponse::from(employee)))
}

pub async fn delete_employee(
    context: RequestContext,
    service: web::Data<EmployeeService>,
    identity_number: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(context.claims()?, &identity_number).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
    })))
}
