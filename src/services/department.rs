use std::sync::Arc;

use uuid::Uuid;

use crate::db::DepartmentRepository;
use crate::errors::AppError;
use crate::models::department::{Department, DepartmentFilter, DepartmentUpdate, NewDepartment};
use crate::utils::jwt::Claims;
use crate::utils::validation::validate_payload;

pub struct DepartmentService {
    departments: Arc<dyn DepartmentRepository>,
}

fn not_found() -> AppError {
    AppError::NotFound("Department not found".to_string())
}

impl DepartmentService {
    pub fn new(departments: Arc<dyn DepartmentRepository>) -> Self {
        Self { departments }
    }

    /// The owner is always the caller, whatever the request body said.
    pub async fn create(&self, claims: &Claims, new_department: NewDepartment) -> Result<Department, AppError> {
        validate_payload(&new_department)?;
        let department = self
            .departments
            .create(claims.manager_id, &new_department.name)
            .await?;
        log::info!(
            "manager {} created department {}",
            claims.manager_id,
            department.department_id
        );
        Ok(department)
    }

    pub async fn list(&self, claims: &Claims, filter: &DepartmentFilter) -> Result<Vec<Department>, AppError> {
        Ok(self.departments.list(claims.manager_id, filter).await?)
    }

    pub async fn update(
        &self,
        claims: &Claims,
        department_id: Uuid,
        update: DepartmentUpdate,
    ) -> Result<Department, AppError> {
        validate_payload(&update)?;
        self.departments
            .update(claims.manager_id, department_id, &update.name)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, claims: &Claims, department_id: Uuid) -> Result<(), AppError> {
        self.departments
            .find_owned(claims.manager_id, department_id)
            .await?
            .ok_or_else(not_found)?;

        if self
            .departments
            .has_active_employees(claims.manager_id, department_id)
            .await?
        {
            return Err(AppError::Conflict("Department still contains employees".to_string()));
        }

        if !self.departments.delete(claims.manager_id, department_id).await? {
            return Err(not_found());
        }
        log::info!("manager {} deleted department {}", claims.manager_id, department_id);
        Ok(())
    }
}
