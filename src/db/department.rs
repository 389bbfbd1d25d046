use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{like_escape, DbError};
use crate::models::department::{Department, DepartmentFilter};

/// Department storage. Every call is scoped to the owning manager: rows
/// belonging to someone else behave exactly like rows that do not exist.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn create(&self, owner: Uuid, name: &str) -> Result<Department, DbError>;

    async fn list(&self, owner: Uuid, filter: &DepartmentFilter) -> Result<Vec<Department>, DbError>;

    async fn find_owned(&self, owner: Uuid, department_id: Uuid) -> Result<Option<Department>, DbError>;

    async fn update(
        &self,
        owner: Uuid,
        department_id: Uuid,
        name: &str,
    ) -> Result<Option<Department>, DbError>;

    /// Counts only employees that are not soft-deleted.
    async fn has_active_employees(&self, owner: Uuid, department_id: Uuid) -> Result<bool, DbError>;

    /// Returns `false` when no owned department matched.
    async fn delete(&self, owner: Uuid, department_id: Uuid) -> Result<bool, DbError>;
}

pub struct PgDepartmentRepository {
    pool: PgPool,
}

impl PgDepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentRepository for PgDepartmentRepository {
    async fn create(&self, owner: Uuid, name: &str) -> Result<Department, DbError> {
        let now = Utc::now();
        let department = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (department_id, name, manager_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(owner)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(department)
    }

    async fn list(&self, owner: Uuid, filter: &DepartmentFilter) -> Result<Vec<Department>, DbError> {
        let mut query_builder: sqlx::QueryBuilder<'_, sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM departments WHERE manager_id = ");
        query_builder.push_bind(owner);

        if let Some(name) = &filter.name {
            query_builder.push(" AND name ILIKE ");
            query_builder.push_bind(format!("%{}%", like_escape(name)));
            query_builder.push(" ESCAPE '\\'");
        }

        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(filter.limit);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(filter.offset);

        let departments = query_builder
            .build_query_as::<Department>()
            .fetch_all(&self.pool)
            .await?;
        Ok(departments)
    }

    async fn find_owned(&self, owner: Uuid, department_id: Uuid) -> Result<Option<Department>, DbError> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE department_id = $1 AND manager_id = $2",
        )
        .bind(department_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(department)
    }

    async fn update(
        &self,
        owner: Uuid,
        department_id: Uuid,
        name: &str,
    ) -> Result<Option<Department>, DbError> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments SET name = $1, updated_at = $2
            WHERE department_id = $3 AND manager_id = $4
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .bind(department_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(department)
    }

    async fn has_active_employees(&self, owner: Uuid, department_id: Uuid) -> Result<bool, DbError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM employees e
                JOIN departments d ON e.department_id = d.department_id
                WHERE e.department_id = $1 AND d.manager_id = $2 AND e.deleted_at IS NULL
            )
            "#,
        )
        .bind(department_id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn delete(&self, owner: Uuid, department_id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM departments WHERE department_id = $1 AND manager_id = $2")
            .bind(department_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
