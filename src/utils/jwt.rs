use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Tokens are valid for exactly this long after issuance.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub")]
    pub manager_id: Uuid,
    pub email: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

#[derive(Debug, Error)]
#[error("token signing failed: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

/// Why a bearer credential was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("Missing Authorization header")]
    MissingAuth,
    #[error("Invalid token format")]
    MalformedAuth,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, manager_id: Uuid, email: &str) -> Result<String, TokenError> {
        self.issue_at(manager_id, email, Utc::now())
    }

    pub fn issue_at(
        &self,
        manager_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            manager_id,
            email: email.to_string(),
            issued_at: now.timestamp(),
            expires_at: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }
}

#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(secret: &str) -> Self {
        // Expiry is checked by hand so that `now == exp` stays valid and the
        // clock can be injected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validates the raw value of an `Authorization` header.
    pub fn validate(&self, authorization: Option<&str>) -> Result<Claims, RejectionReason> {
        self.validate_at(authorization, Utc::now())
    }

    pub fn validate_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Claims, RejectionReason> {
        let header = authorization
            .filter(|value| !value.is_empty())
            .ok_or(RejectionReason::MissingAuth)?;
        let token = bearer_token(header).ok_or(RejectionReason::MalformedAuth)?;
        self.validate_token_at(token, now)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, RejectionReason> {
        self.validate_token_at(token, Utc::now())
    }

    pub fn validate_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, RejectionReason> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                log::debug!("token rejected: {}", err);
                RejectionReason::InvalidToken
            })?;

        if now.timestamp() > claims.expires_at {
            return Err(RejectionReason::TokenExpired);
        }

        Ok(claims)
    }
}

/// Extracts `<token>` from `Bearer <token>`. The token must be visible ASCII.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?;
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_graphic()) {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    const SECRET: &str = "test-secret-for-gogomanager";

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn issued_token_round_trips() {
        let issuer = TokenIssuer::new(SECRET);
        let validator = TokenValidator::new(SECRET);
        let manager_id = Uuid::new_v4();

        let token = issuer.issue(manager_id, "a@b.com").unwrap();
        let claims = validator.validate(Some(&bearer(&token))).unwrap();

        assert_eq!(claims.manager_id, manager_id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.expires_at - claims.issued_at, 24 * 60 * 60);
    }

    #[test]
    fn foreign_secret_is_invalid() {
        let token = TokenIssuer::new("issuer-secret")
            .issue(Uuid::new_v4(), "a@b.com")
            .unwrap();
        let result = TokenValidator::new("other-secret").validate_token(&token);
        assert_eq!(result, Err(RejectionReason::InvalidToken));
    }

    #[test]
    fn expiry_is_strictly_after_expires_at() {
        let issuer = TokenIssuer::new(SECRET);
        let validator = TokenValidator::new(SECRET);
        let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS);
        let token = issuer.issue_at(Uuid::new_v4(), "a@b.com", issued).unwrap();
        let expires_at = issued + Duration::hours(TOKEN_TTL_HOURS);

        assert!(validator.validate_token_at(&token, expires_at).is_ok());
        assert_eq!(
            validator.validate_token_at(&token, expires_at + Duration::seconds(1)),
            Err(RejectionReason::TokenExpired)
        );
    }

    #[test]
    fn long_expired_token_is_rejected_with_real_clock() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer
            .issue_at(Uuid::new_v4(), "a@b.com", Utc::now() - Duration::days(3))
            .unwrap();
        assert_eq!(
            TokenValidator::new(SECRET).validate(Some(&bearer(&token))),
            Err(RejectionReason::TokenExpired)
        );
    }

    #[test]
    fn missing_and_malformed_headers() {
        let validator = TokenValidator::new(SECRET);
        assert_eq!(validator.validate(None), Err(RejectionReason::MissingAuth));
        assert_eq!(validator.validate(Some("")), Err(RejectionReason::MissingAuth));

        for header in ["Bearer", "Bearer ", "bearer abc", "Token abc", "Bearer a b", "Bearer  abc"] {
            assert_eq!(
                validator.validate(Some(header)),
                Err(RejectionReason::MalformedAuth),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn non_ascii_token_is_malformed() {
        let validator = TokenValidator::new(SECRET);
        for header in ["Bearer é", "Bearer abc\u{7f}", "Bearer tök.en.x"] {
            assert_eq!(
                validator.validate(Some(header)),
                Err(RejectionReason::MalformedAuth),
                "header {:?}",
                header
            );
        }
        assert_eq!(bearer_token("Bearer é"), None);
    }

    #[test]
    fn garbage_token_is_invalid() {
        let validator = TokenValidator::new(SECRET);
        assert_eq!(
            validator.validate(Some("Bearer not.a.jwt")),
            Err(RejectionReason::InvalidToken)
        );
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let token = TokenIssuer::new(SECRET).issue(Uuid::new_v4(), "a@b.com").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_claims = Claims {
            manager_id: Uuid::new_v4(),
            email: "a@b.com".into(),
            issued_at: Utc::now().timestamp(),
            expires_at: Utc::now().timestamp() + 3600,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            TokenValidator::new(SECRET).validate_token(&forged),
            Err(RejectionReason::InvalidToken)
        );
    }

    #[test]
    fn other_hmac_strengths_are_accepted() {
        let claims = Claims {
            manager_id: Uuid::new_v4(),
            email: "a@b.com".into(),
            issued_at: Utc::now().timestamp(),
            expires_at: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(TokenValidator::new(SECRET).validate_token(&token), Ok(claims));
    }

    #[test]
    fn non_hmac_algorithm_is_invalid() {
        let token = TokenIssuer::new(SECRET).issue(Uuid::new_v4(), "a@b.com").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        for alg in ["RS256", "none"] {
            let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{}","typ":"JWT"}}"#, alg));
            let forged = format!("{}.{}.{}", header, parts[1], parts[2]);
            assert_eq!(
                TokenValidator::new(SECRET).validate_token(&forged),
                Err(RejectionReason::InvalidToken),
                "alg {}",
                alg
            );
        }
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
