use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::utils::jwt::Claims;

/// Per-request carrier for the caller's identity and the process config.
///
/// Claims are attached at most once, by [`authenticate`](super::authenticate),
/// and are read-only afterwards. Handlers that need an identity must call
/// [`RequestContext::claims`], which fails closed.
#[derive(Debug, Clone)]
pub struct RequestContext {
    claims: Option<Claims>,
    config: Arc<AppConfig>,
}

impl RequestContext {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            claims: None,
            config,
        }
    }

    pub fn attach(self, claims: Claims) -> Result<Self, AppError> {
        if self.claims.is_some() {
            return Err(AppError::internal("request identity attached twice"));
        }
        Ok(Self {
            claims: Some(claims),
            config: self.config,
        })
    }

    pub fn claims(&self) -> Result<&Claims, AppError> {
        self.claims
            .as_ref()
            .ok_or_else(|| AppError::Unauthenticated("User not authenticated".to_string()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl FromRequest for RequestContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(context) = req.extensions().get::<RequestContext>() {
            return ready(Ok(context.clone()));
        }

        let context = req
            .app_data::<web::Data<AppConfig>>()
            .map(|config| RequestContext::new(config.clone().into_inner()))
            .ok_or_else(|| AppError::internal("AppConfig missing from app data"));
        ready(context)
    }
}
