use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_image_uri;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Employee {
    pub employee_id: Uuid,
    pub identity_number: String,
    pub name: String,
    pub employee_image_uri: String,
    pub gender: String,
    pub department_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[validate(length(min = 5, max = 33))]
    pub identity_number: String,
    #[validate(length(min = 4, max = 33))]
    pub name: String,
    #[validate(custom = "validate_image_uri")]
    pub employee_image_uri: String,
    pub gender: Gender,
    pub department_id: Uuid,
}

#[derive(Deserialize, Validate, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmployeeUpdate {
    #[validate(length(min = 5, max = 33))]
    pub identity_number: Option<String>,
    #[validate(length(min = 4, max = 33))]
    pub name: Option<String>,
    #[validate(custom = "validate_image_uri")]
    pub employee_image_uri: Option<String>,
    pub gender: Option<Gender>,
    pub department_id: Option<Uuid>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub identity_number: String,
    pub name: String,
    pub employee_image_uri: String,
    pub gender: String,
    pub department_id: String,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            identity_number: employee.identity_number,
            name: employee.name,
            employee_image_uri: employee.employee_image_uri,
            gender: employee.gender,
            department_id: employee.department_id.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQueryParams {
    pub identity_number: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub identity_number: Option<String>,
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub department_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

impl EmployeeQueryParams {
    /// Unparsable gender or department filters are dropped rather than rejected.
    pub fn into_filter(self, default_limit: i64) -> EmployeeFilter {
        EmployeeFilter {
            identity_number: self.identity_number.filter(|v| !v.is_empty()),
            name: self.name.filter(|v| !v.is_empty()),
            gender: self.gender.as_deref().and_then(Gender::parse),
            department_id: self
                .department_id
                .as_deref()
                .and_then(|id| Uuid::parse_str(id).ok()),
            limit: super::page_limit(self.limit, default_limit),
            offset: super::page_offset(self.offset),
        }
    }
}
