use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthAction {
    Create,
    Login,
}

/// Register/login request body. Lives for one request only.
#[derive(Deserialize, Validate, Clone)]
#[serde(deny_unknown_fields)]
pub struct Credential {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 32))]
    pub password: String,
    pub action: AuthAction,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("action", &self.action)
            .finish()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub email: String,
    pub token: String,
}
