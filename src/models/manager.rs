use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_image_uri;

/// Row of the `managers` table. Not serializable: it carries the password hash.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Manager {
    pub manager_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub user_image_uri: Option<String>,
    pub company_name: Option<String>,
    pub company_image_uri: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManagerUpdate {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 32))]
    pub password: Option<String>,
    #[validate(length(min = 4, max = 52))]
    pub name: Option<String>,
    #[validate(custom = "validate_image_uri")]
    pub user_image_uri: Option<String>,
    #[validate(length(min = 4, max = 52))]
    pub company_name: Option<String>,
    #[validate(custom = "validate_image_uri")]
    pub company_image_uri: Option<String>,
}

/// Column changes for a profile update, with the password already hashed.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub user_image_uri: Option<String>,
    pub company_name: Option<String>,
    pub company_image_uri: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ManagerProfile {
    pub email: String,
    pub name: String,
    pub user_image_uri: String,
    pub company_name: String,
    pub company_image_uri: String,
}

impl From<Manager> for ManagerProfile {
    fn from(manager: Manager) -> Self {
        Self {
            email: manager.email,
            name: manager.name.unwrap_or_default(),
            user_image_uri: manager.user_image_uri.unwrap_or_default(),
            company_name: manager.company_name.unwrap_or_default(),
            company_image_uri: manager.company_image_uri.unwrap_or_default(),
        }
    }
}
