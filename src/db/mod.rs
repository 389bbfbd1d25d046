pub mod department;
pub mod employee;
pub mod manager;
pub mod memory;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::AppConfig;
use crate::errors::AppError;

pub use department::{DepartmentRepository, PgDepartmentRepository};
pub use employee::{EmployeeRepository, PgEmployeeRepository};
pub use manager::{ManagerRepository, PgManagerRepository};
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DbError::UniqueViolation(db_err.constraint().unwrap_or_default().to_string());
            }
        }
        DbError::Sqlx(err)
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::internal(err)
    }
}

/// Escapes `LIKE` metacharacters so user text matches literally; pair with `ESCAPE '\'`.
pub(crate) fn like_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub async fn create_pool(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// The storage collaborators every service is built from.
#[derive(Clone)]
pub struct Repositories {
    pub managers: Arc<dyn ManagerRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            managers: Arc::new(PgManagerRepository::new(pool.clone())),
            departments: Arc::new(PgDepartmentRepository::new(pool.clone())),
            employees: Arc::new(PgEmployeeRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            managers: store.clone(),
            departments: store.clone(),
            employees: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::like_escape;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(like_escape("1_3"), "1\\_3");
        assert_eq!(like_escape("100%"), "100\\%");
        assert_eq!(like_escape("a\\b"), "a\\\\b");
        assert_eq!(like_escape("plain"), "plain");
    }
}
