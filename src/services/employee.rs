use std::sync::Arc;

use uuid::Uuid;

use crate::db::{DbError, DepartmentRepository, EmployeeRepository};
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeFilter, EmployeeUpdate, NewEmployee};
use crate::utils::jwt::Claims;
use crate::utils::validation::validate_payload;

/// Employee use cases. An employee belongs to whoever owns its department.
pub struct EmployeeService {
    employees: Arc<dyn EmployeeRepository>,
    departments: Arc<dyn DepartmentRepository>,
}

fn not_found() -> AppError {
    AppError::NotFound("Employee not found".to_string())
}

fn foreign_department() -> AppError {
    AppError::Forbidden("Department does not belong to you".to_string())
}

fn conflict_on_identity(err: DbError) -> AppError {
    match err {
        DbError::UniqueViolation(_) => AppError::Conflict("Identity number already exists".to_string()),
        other => AppError::from(other),
    }
}

impl EmployeeService {
    pub fn new(employees: Arc<dyn EmployeeRepository>, departments: Arc<dyn DepartmentRepository>) -> Self {
        Self {
            employees,
            departments,
        }
    }

    pub async fn create(&self, claims: &Claims, new_employee: NewEmployee) -> Result<Employee, AppError> {
        validate_payload(&new_employee)?;
        self.ensure_department_owned(claims, new_employee.department_id)
            .await?;

        let employee = self
            .employees
            .create(claims.manager_id, &new_employee)
            .await
            .map_err(conflict_on_identity)?
            // The department vanished or changed hands between the two statements.
            .ok_or_else(foreign_department)?;
        log::info!(
            "manager {} created employee {}",
            claims.manager_id,
            employee.employee_id
        );
        Ok(employee)
    }

    pub async fn list(&self, claims: &Claims, filter: &EmployeeFilter) -> Result<Vec<Employee>, AppError> {
        Ok(self.employees.list(claims.manager_id, filter).await?)
    }

    pub async fn update(
        &self,
        claims: &Claims,
        identity_number: &str,
        changes: EmployeeUpdate,
    ) -> Result<Employee, AppError> {
        validate_payload(&changes)?;

        let current = self
            .employees
            .find_owned(claims.manager_id, identity_number)
            .await?
            .ok_or_else(not_found)?;

        if let Some(department_id) = changes.department_id {
            if department_id != current.department_id {
                self.ensure_department_owned(claims, department_id).await?;
            }
        }

        self.employees
            .update(claims.manager_id, identity_number, &changes)
            .await
            .map_err(conflict_on_identity)?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, claims: &Claims, identity_number: &str) -> Result<(), AppError> {
        if !self
            .employees
            .soft_delete(claims.manager_id, identity_number)
            .await?
        {
            return Err(not_found());
        }
        log::info!(
            "manager {} deleted employee {}",
            claims.manager_id,
            identity_number
        );
        Ok(())
    }

    async fn ensure_department_owned(&self, claims: &Claims, department_id: Uuid) -> Result<(), AppError> {
        match self
            .departments
            .find_owned(claims.manager_id, department_id)
            .await?
        {
            Some(_) => Ok(()),
            None => {
                log::warn!(
                    "manager {} referenced department {} they do not own",
                    claims.manager_id,
                    department_id
                );
                Err(foreign_department())
            }
        }
    }
}
