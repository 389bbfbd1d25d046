use actix_web::middleware::from_fn;
use actix_web::web;

use crate::config::AppConfig;
use crate::db::Repositories;
use crate::errors::AppError;
use crate::handlers;
use crate::middleware::authenticate;
use crate::services::{AuthService, DepartmentService, EmployeeService, ManagerService};
use crate::utils::jwt::{TokenIssuer, TokenValidator};

/// Everything the HTTP layer shares across workers. Built once at startup;
/// each field is an `Arc`, so cloning into every worker is cheap.
#[derive(Clone)]
pub struct AppState {
    config: web::Data<AppConfig>,
    validator: web::Data<TokenValidator>,
    auth: web::Data<AuthService>,
    managers: web::Data<ManagerService>,
    departments: web::Data<DepartmentService>,
    employees: web::Data<EmployeeService>,
}

impl AppState {
    pub fn new(config: AppConfig, repositories: Repositories) -> Self {
        let issuer = TokenIssuer::new(&config.jwt_secret);
        let validator = TokenValidator::new(&config.jwt_secret);
        Self {
            auth: web::Data::new(AuthService::new(repositories.managers.clone(), issuer)),
            managers: web::Data::new(ManagerService::new(repositories.managers)),
            departments: web::Data::new(DepartmentService::new(repositories.departments.clone())),
            employees: web::Data::new(EmployeeService::new(
                repositories.employees,
                repositories.departments,
            )),
            validator: web::Data::new(validator),
            config: web::Data::new(config),
        }
    }

    /// Registers shared state, extractor error handlers and all `/v1` routes.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.validator.clone())
            .app_data(self.auth.clone())
            .app_data(self.managers.clone())
            .app_data(self.departments.clone())
            .app_data(self.employees.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(format!("Invalid request body: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(format!("Invalid query string: {}", err)).into()
            }))
            .service(web::resource("/v1/auth").route(web::post().to(handlers::auth::auth_handler)))
            .service(
                web::resource("/v1/user")
                    .wrap(from_fn(authenticate))
                    .route(web::get().to(handlers::user::get_user_profile))
                    .route(web::patch().to(handlers::user::update_user_profile)),
            )
            .service(
                web::resource("/v1/department")
                    .wrap(from_fn(authenticate))
                    .route(web::post().to(handlers::department::create_department))
                    .route(web::get().to(handlers::department::get_departments)),
            )
            .service(
                web::resource("/v1/department/{department_id}")
                    .wrap(from_fn(authenticate))
                    .route(web::patch().to(handlers::department::update_department))
                    .route(web::delete().to(handlers::department::delete_department)),
            )
            .service(
                web::resource("/v1/employee")
                    .wrap(from_fn(authenticate))
                    .route(web::post().to(handlers::employee::create_employee))
                    .route(web::get().to(handlers::employee::get_employees)),
            )
            .service(
                web::resource("/v1/employee/{identity_number}")
                    .wrap(from_fn(authenticate))
                    .route(web::patch().to(handlers::employee::update_employee))
                    .route(web::delete().to(handlers::employee::delete_employee)),
            );
    }
}
