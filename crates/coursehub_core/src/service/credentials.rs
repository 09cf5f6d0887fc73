//! Salted password hashing at the user-creation boundary.
//!
//! # Invariants
//! - Stored credentials are Argon2id PHC strings; plaintext never persists.
//! - Verification reads cost parameters from the stored hash, so changing
//!   the configured cost does not invalidate older hashes.

use crate::config::PasswordHashingConfig;
use crate::service::error::{DataError, DataResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(config: &PasswordHashingConfig) -> DataResult<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|err| DataError::Credential(format!("invalid argon2 parameters: {err}")))?;
        Ok(Self { params })
    }

    pub fn hash(&self, password: &str) -> DataResult<String> {
        if password.is_empty() {
            return Err(DataError::Credential("password must not be empty".to_string()));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| DataError::Credential(format!("password hashing failed: {err}")))?;
        Ok(hash.to_string())
    }

    /// False for a wrong password and for anything that is not a PHC string.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn is_hashed(stored: &str) -> bool {
        PasswordHash::new(stored).is_ok()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::CredentialHasher;
    use crate::config::PasswordHashingConfig;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(&PasswordHashingConfig::low_cost()).unwrap()
    }

    #[test]
    fn hash_verifies_and_hides_plaintext() {
        let hasher = hasher();
        let stored = hasher.hash("hunter2").unwrap();

        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("hunter2"));
        assert!(hasher.verify("hunter2", &stored));
        assert!(!hasher.verify("hunter3", &stored));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = hasher();
        assert_ne!(hasher.hash("pw").unwrap(), hasher.hash("pw").unwrap());
    }

    #[test]
    fn plaintext_is_not_treated_as_a_hash() {
        let hasher = hasher();
        assert!(!CredentialHasher::is_hashed("password123"));
        assert!(!hasher.verify("password123", "password123"));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(hasher().hash("").is_err());
    }
}
