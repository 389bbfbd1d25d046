use std::sync::Arc;

use actix_web::web;
use uuid::Uuid;

use crate::db::{DbError, ManagerRepository};
use crate::errors::AppError;
use crate::models::auth::{AuthAction, AuthResponse, Credential};
use crate::utils::jwt::TokenIssuer;
use crate::utils::password::{self, PasswordError};
use crate::utils::validation::validate_payload;

/// Result of a successful register/login.
#[derive(Debug)]
pub struct AuthOutcome {
    pub action: AuthAction,
    pub response: AuthResponse,
}

/// Register/login use case. Holds no per-request state.
pub struct AuthService {
    managers: Arc<dyn ManagerRepository>,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(managers: Arc<dyn ManagerRepository>, issuer: TokenIssuer) -> Self {
        Self { managers, issuer }
    }

    pub async fn authenticate(&self, credential: Credential) -> Result<AuthOutcome, AppError> {
        validate_payload(&credential)?;

        let response = match credential.action {
            AuthAction::Create => self.register(credential.email, credential.password).await?,
            AuthAction::Login => self.login(credential.email, credential.password).await?,
        };

        Ok(AuthOutcome {
            action: credential.action,
            response,
        })
    }

    async fn register(&self, email: String, password: String) -> Result<AuthResponse, AppError> {
        let password_hash = hash_blocking(password).await?;

        let manager = self
            .managers
            .create(&email, &password_hash)
            .await
            .map_err(|err| match err {
                DbError::UniqueViolation(_) => AppError::Conflict("Email already registered".to_string()),
                other => AppError::from(other),
            })?;
        log::info!("registered manager {}", manager.manager_id);

        let token = self.issue(manager.manager_id, &manager.email)?;
        Ok(AuthResponse {
            email: manager.email,
            token,
        })
    }

    async fn login(&self, email: String, password: String) -> Result<AuthResponse, AppError> {
        let manager = self
            .managers
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let stored_hash = manager.password_hash.clone();
        let verified = web::block(move || password::verify_password(&stored_hash, &password))
            .await
            .map_err(AppError::internal)?;
        match verified {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                log::warn!("failed login for manager {}", manager.manager_id);
                return Err(AppError::Unauthenticated("Invalid credential".to_string()));
            }
            Err(err) => {
                return Err(AppError::internal(format!(
                    "password verification for manager {}: {}",
                    manager.manager_id, err
                )))
            }
        }

        let token = self.issue(manager.manager_id, &manager.email)?;
        Ok(AuthResponse {
            email: manager.email,
            token,
        })
    }

    fn issue(&self, manager_id: Uuid, email: &str) -> Result<String, AppError> {
        self.issuer
            .issue(manager_id, email)
            .map_err(|err| AppError::internal(format!("token for manager {}: {}", manager_id, err)))
    }
}

/// Runs Argon2 on the blocking pool.
pub(crate) async fn hash_blocking(password: String) -> Result<String, AppError> {
    web::block(move || password::hash_password(&password))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::errors::ErrorKind;
    use crate::utils::jwt::TokenValidator;

    const SECRET: &str = "auth-service-secret";

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), TokenIssuer::new(SECRET))
    }

    fn credential(email: &str, password: &str, action: AuthAction) -> Credential {
        Credential {
            email: email.to_string(),
            password: password.to_string(),
            action,
        }
    }

    #[actix_web::test]
    async fn register_then_login_issue_valid_tokens() {
        let service = service();
        let validator = TokenValidator::new(SECRET);

        let registered = service
            .authenticate(credential("a@b.com", "cobalagi1", AuthAction::Create))
            .await
            .unwrap();
        assert_eq!(registered.action, AuthAction::Create);
        let first = validator.validate_token(&registered.response.token).unwrap();

        let logged_in = service
            .authenticate(credential("a@b.com", "cobalagi1", AuthAction::Login))
            .await
            .unwrap();
        let second = validator.validate_token(&logged_in.response.token).unwrap();

        assert_eq!(first.manager_id, second.manager_id);
        assert_eq!(second.email, "a@b.com");
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let service = service();
        service
            .authenticate(credential("a@b.com", "cobalagi1", AuthAction::Create))
            .await
            .unwrap();
        let err = service
            .authenticate(credential("a@b.com", "different1", AuthAction::Create))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[actix_web::test]
    async fn login_failures() {
        let service = service();
        let err = service
            .authenticate(credential("nobody@b.com", "cobalagi1", AuthAction::Login))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        service
            .authenticate(credential("a@b.com", "cobalagi1", AuthAction::Create))
            .await
            .unwrap();
        let err = service
            .authenticate(credential("a@b.com", "wrongpass1", AuthAction::Login))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[actix_web::test]
    async fn input_rules_are_enforced() {
        let service = service();
        let too_long = "x".repeat(33);
        for (email, password) in [
            ("not-an-email", "cobalagi1"),
            ("a@b.com", "short"),
            ("a@b.com", too_long.as_str()),
        ] {
            let err = service
                .authenticate(credential(email, password, AuthAction::Create))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{} / {}", email, password);
        }
    }
}
