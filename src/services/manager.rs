use std::sync::Arc;

use crate::db::{DbError, ManagerRepository};
use crate::errors::AppError;
use crate::models::manager::{ManagerProfile, ManagerUpdate, ProfileChanges};
use crate::utils::jwt::Claims;
use crate::utils::validation::validate_payload;

use super::auth::hash_blocking;

pub struct ManagerService {
    managers: Arc<dyn ManagerRepository>,
}

fn not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

impl ManagerService {
    pub fn new(managers: Arc<dyn ManagerRepository>) -> Self {
        Self { managers }
    }

    pub async fn profile(&self, claims: &Claims) -> Result<ManagerProfile, AppError> {
        let manager = self
            .managers
            .find_by_id(claims.manager_id)
            .await?
            .ok_or_else(not_found)?;
        Ok(manager.into())
    }

    /// Applies the fields present in `update`; a new password is re-hashed.
    pub async fn update_profile(&self, claims: &Claims, update: ManagerUpdate) -> Result<ManagerProfile, AppError> {
        validate_payload(&update)?;

        let password_hash = match update.password {
            Some(password) => Some(hash_blocking(password).await?),
            None => None,
        };
        let changes = ProfileChanges {
            email: update.email,
            password_hash,
            name: update.name,
            user_image_uri: update.user_image_uri,
            company_name: update.company_name,
            company_image_uri: update.company_image_uri,
        };

        let manager = self
            .managers
            .update_profile(claims.manager_id, changes)
            .await
            .map_err(|err| match err {
                DbError::UniqueViolation(_) => AppError::Conflict("Email already registered".to_string()),
                other => AppError::from(other),
            })?
            .ok_or_else(not_found)?;
        log::info!("manager {} updated their profile", manager.manager_id);
        Ok(manager.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::errors::ErrorKind;
    use crate::utils::password;
    use uuid::Uuid;

    async fn registered(store: &MemoryStore, email: &str) -> Claims {
        let manager = ManagerRepository::create(store, email, "not-a-real-hash")
            .await
            .unwrap();
        Claims {
            manager_id: manager.manager_id,
            email: manager.email,
            issued_at: 0,
            expires_at: i64::MAX,
        }
    }

    #[actix_web::test]
    async fn fresh_profile_has_empty_optional_fields() {
        let store = Arc::new(MemoryStore::new());
        let claims = registered(&store, "a@b.com").await;
        let service = ManagerService::new(store);

        let profile = service.profile(&claims).await.unwrap();
        assert_eq!(profile.email, "a@b.com");
        assert_eq!(profile.name, "");
        assert_eq!(profile.company_image_uri, "");
    }

    #[actix_web::test]
    async fn unknown_manager_is_not_found() {
        let service = ManagerService::new(Arc::new(MemoryStore::new()));
        let claims = Claims {
            manager_id: Uuid::new_v4(),
            email: "ghost@b.com".into(),
            issued_at: 0,
            expires_at: i64::MAX,
        };
        assert_eq!(service.profile(&claims).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[actix_web::test]
    async fn partial_update_keeps_other_fields_and_rehashes_password() {
        let store = Arc::new(MemoryStore::new());
        let claims = registered(&store, "a@b.com").await;
        let service = ManagerService::new(store.clone());

        let update = ManagerUpdate {
            name: Some("Dewi Lestari".into()),
            company_image_uri: Some("https://cdn.example.com/logo.png".into()),
            password: Some("newpassword1".into()),
            ..Default::default()
        };
        let profile = service.update_profile(&claims, update).await.unwrap();
        assert_eq!(profile.email, "a@b.com");
        assert_eq!(profile.name, "Dewi Lestari");
        assert_eq!(profile.company_image_uri, "https://cdn.example.com/logo.png");

        let stored = store.find_by_id(claims.manager_id).await.unwrap().unwrap();
        password::verify_password(&stored.password_hash, "newpassword1").unwrap();
    }

    #[actix_web::test]
    async fn email_clash_and_bad_fields_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let claims = registered(&store, "a@b.com").await;
        registered(&store, "taken@b.com").await;
        let service = ManagerService::new(store);

        let clash = ManagerUpdate {
            email: Some("TAKEN@b.com".into()),
            ..Default::default()
        };
        let err = service.update_profile(&claims, clash).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let bad_uri = ManagerUpdate {
            user_image_uri: Some("http://localhost/me.png".into()),
            ..Default::default()
        };
        let err = service.update_profile(&claims, bad_uri).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
