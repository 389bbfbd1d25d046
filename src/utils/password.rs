use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed")]
    HashingFailed,
    #[error("stored password hash is malformed")]
    MalformedHash,
    #[error("password does not match")]
    Mismatch,
}

/// Hashes `password` with Argon2id and a fresh salt.
///
/// The returned PHC string embeds algorithm, parameters and salt, so
/// [`verify_password`] needs nothing else.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

pub fn verify_password(hash: &str, password: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::MalformedHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|err| match err {
            argon2::password_hash::Error::Password => PasswordError::Mismatch,
            _ => PasswordError::MalformedHash,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_the_original_password() {
        let hash = hash_password("cobalagi1").unwrap();
        assert_eq!(verify_password(&hash, "cobalagi1"), Ok(()));
    }

    #[test]
    fn rejects_a_different_password() {
        let hash = hash_password("cobalagi1").unwrap();
        assert_eq!(verify_password(&hash, "cobalagi2"), Err(PasswordError::Mismatch));
        assert_eq!(verify_password(&hash, ""), Err(PasswordError::Mismatch));
    }

    #[test]
    fn salts_every_hash() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(!first.contains("same-password"));
    }

    #[test]
    fn garbage_hash_is_malformed() {
        assert_eq!(
            verify_password("not-a-phc-string", "whatever"),
            Err(PasswordError::MalformedHash)
        );
    }
}
