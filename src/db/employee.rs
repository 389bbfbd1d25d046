use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{like_escape, DbError};
use crate::models::employee::{Employee, EmployeeFilter, EmployeeUpdate, NewEmployee};

/// Employee storage. Ownership flows through the employee's department:
/// every statement joins `departments` and filters on its `manager_id`.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn list(&self, owner: Uuid, filter: &EmployeeFilter) -> Result<Vec<Employee>, DbError>;

    /// Inserts only when `employee.department_id` is owned by `owner`;
    /// returns `None` otherwise.
    async fn create(&self, owner: Uuid, employee: &NewEmployee) -> Result<Option<Employee>, DbError>;

    async fn find_owned(&self, owner: Uuid, identity_number: &str) -> Result<Option<Employee>, DbError>;

    /// Callers must have checked that a changed `department_id` is owned too.
    async fn update(
        &self,
        owner: Uuid,
        identity_number: &str,
        changes: &EmployeeUpdate,
    ) -> Result<Option<Employee>, DbError>;

    /// Soft-deletes; returns `false` when no owned, live employee matched.
    async fn soft_delete(&self, owner: Uuid, identity_number: &str) -> Result<bool, DbError>;
}

pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn list(&self, owner: Uuid, filter: &EmployeeFilter) -> Result<Vec<Employee>, DbError> {
        let mut query_builder: sqlx::QueryBuilder<'_, sqlx::Postgres> = sqlx::QueryBuilder::new(
            r#"
            SELECT e.* FROM employees e
            JOIN departments d ON e.department_id = d.department_id
            WHERE e.deleted_at IS NULL AND d.manager_id = "#,
        );
        query_builder.push_bind(owner);

        if let Some(identity_number) = &filter.identity_number {
            query_builder.push(" AND e.identity_number LIKE ");
            query_builder.push_bind(format!("{}%", like_escape(identity_number)));
            query_builder.push(" ESCAPE '\\'");
        }
        if let Some(name) = &filter.name {
            query_builder.push(" AND e.name ILIKE ");
            query_builder.push_bind(format!("%{}%", like_escape(name)));
            query_builder.push(" ESCAPE '\\'");
        }
        if let Some(gender) = filter.gender {
            query_builder.push(" AND e.gender = ");
            query_builder.push_bind(gender.as_str());
        }
        if let Some(department_id) = filter.department_id {
            query_builder.push(" AND e.department_id = ");
            query_builder.push_bind(department_id);
        }

        query_builder.push(" ORDER BY e.created_at DESC LIMIT ");
        query_builder.push_bind(filter.limit);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(filter.offset);

        let employees = query_builder
            .build_query_as::<Employee>()
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn create(&self, owner: Uuid, employee: &NewEmployee) -> Result<Option<Employee>, DbError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (
                employee_id, identity_number, name, employee_image_uri, gender,
                department_id, created_at, updated_at
            )
            SELECT $1, $2, $3, $4, $5, d.department_id, $6, $6
            FROM departments d
            WHERE d.department_id = $7 AND d.manager_id = $8
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&employee.identity_number)
        .bind(&employee.name)
        .bind(&employee.employee_image_uri)
        .bind(employee.gender.as_str())
        .bind(now)
        .bind(employee.department_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_owned(&self, owner: Uuid, identity_number: &str) -> Result<Option<Employee>, DbError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT e.* FROM employees e
            JOIN departments d ON e.department_id = d.department_id
            WHERE e.identity_number = $1 AND e.deleted_at IS NULL AND d.manager_id = $2
            "#,
        )
        .bind(identity_number)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn update(
        &self,
        owner: Uuid,
        identity_number: &str,
        changes: &EmployeeUpdate,
    ) -> Result<Option<Employee>, DbError> {
        let mut query_builder: sqlx::QueryBuilder<'_, sqlx::Postgres> =
            sqlx::QueryBuilder::new("UPDATE employees e SET updated_at = ");
        query_builder.push_bind(Utc::now());

        if let Some(identity_number) = &changes.identity_number {
            query_builder.push(", identity_number = ");
            query_builder.push_bind(identity_number.clone());
        }
        if let Some(name) = &changes.name {
            query_builder.push(", name = ");
            query_builder.push_bind(name.clone());
        }
        if let Some(employee_image_uri) = &changes.employee_image_uri {
            query_builder.push(", employee_image_uri = ");
            query_builder.push_bind(employee_image_uri.clone());
        }
        if let Some(gender) = changes.gender {
            query_builder.push(", gender = ");
            query_builder.push_bind(gender.as_str());
        }
        if let Some(department_id) = changes.department_id {
            query_builder.push(", department_id = ");
            query_builder.push_bind(department_id);
        }

        // The join sees the pre-update row, so ownership is checked against
        // the employee's current department.
        query_builder.push(
            " FROM departments d WHERE e.department_id = d.department_id AND e.deleted_at IS NULL AND d.manager_id = ",
        );
        query_builder.push_bind(owner);
        query_builder.push(" AND e.identity_number = ");
        query_builder.push_bind(identity_number.to_string());
        query_builder.push(" RETURNING e.*");

        let employee = query_builder
            .build_query_as::<Employee>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn soft_delete(&self, owner: Uuid, identity_number: &str) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE employees e SET deleted_at = $1, updated_at = $1
            FROM departments d
            WHERE e.department_id = d.department_id
            AND e.identity_number = $2
            AND e.deleted_at IS NULL
            AND d.manager_id = $3
            "#,
        )
        .bind(now)
        .bind(identity_number)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
