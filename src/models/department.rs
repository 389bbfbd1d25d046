use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Department {
    pub department_id: Uuid,
    pub name: String,
    pub manager_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /v1/department`. Any owner field a client sends is ignored.
#[derive(Deserialize, Validate, Debug)]
pub struct NewDepartment {
    #[validate(length(min = 4, max = 33))]
    pub name: String,
}

#[derive(Deserialize, Validate, Debug)]
pub struct DepartmentUpdate {
    #[validate(length(min = 4, max = 33))]
    pub name: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct DepartmentQueryParams {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentFilter {
    pub name: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl DepartmentQueryParams {
    pub fn into_filter(self, default_limit: i64) -> DepartmentFilter {
        DepartmentFilter {
            name: self.name.filter(|name| !name.is_empty()),
            limit: super::page_limit(self.limit, default_limit),
            offset: super::page_offset(self.offset),
        }
    }
}
