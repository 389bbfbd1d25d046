use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::models::manager::{Manager, ProfileChanges};

#[async_trait]
pub trait ManagerRepository: Send + Sync {
    /// Case-insensitive lookup; soft-deleted managers are invisible.
    async fn find_by_email(&self, email: &str) -> Result<Option<Manager>, DbError>;

    async fn find_by_id(&self, manager_id: Uuid) -> Result<Option<Manager>, DbError>;

    /// Fails with [`DbError::UniqueViolation`] when the email is taken.
    async fn create(&self, email: &str, password_hash: &str) -> Result<Manager, DbError>;

    async fn update_profile(
        &self,
        manager_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<Manager>, DbError>;
}

pub struct PgManagerRepository {
    pool: PgPool,
}

impl PgManagerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ManagerRepository for PgManagerRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Manager>, DbError> {
        let manager = sqlx::query_as::<_, Manager>(
            "SELECT * FROM managers WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(manager)
    }

    async fn find_by_id(&self, manager_id: Uuid) -> Result<Option<Manager>, DbError> {
        let manager = sqlx::query_as::<_, Manager>(
            "SELECT * FROM managers WHERE manager_id = $1 AND deleted_at IS NULL",
        )
        .bind(manager_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(manager)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<Manager, DbError> {
        let now = Utc::now();
        let manager = sqlx::query_as::<_, Manager>(
            r#"
            INSERT INTO managers (manager_id, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(manager)
    }

    async fn update_profile(
        &self,
        manager_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Option<Manager>, DbError> {
        let mut query: sqlx::QueryBuilder<'_, sqlx::Postgres> =
            sqlx::QueryBuilder::new("UPDATE managers SET ");
        let mut separated = query.separated(", ");

        if let Some(email) = changes.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }
        if let Some(password_hash) = changes.password_hash {
            separated.push("password_hash = ");
            separated.push_bind_unseparated(password_hash);
        }
        if let Some(name) = changes.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(user_image_uri) = changes.user_image_uri {
            separated.push("user_image_uri = ");
            separated.push_bind_unseparated(user_image_uri);
        }
        if let Some(company_name) = changes.company_name {
            separated.push("company_name = ");
            separated.push_bind_unseparated(company_name);
        }
        if let Some(company_image_uri) = changes.company_image_uri {
            separated.push("company_image_uri = ");
            separated.push_bind_unseparated(company_image_uri);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE manager_id = ");
        query.push_bind(manager_id);
        query.push(" AND deleted_at IS NULL RETURNING *");

        let manager = query
            .build_query_as::<Manager>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(manager)
    }
}
