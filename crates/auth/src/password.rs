//! Argon2id password hashes and password strength rules.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
};
use rand::Rng;

use crate::{AuthError, AuthResult};

/// Default Argon2 memory cost in KiB.
pub const DEFAULT_PASSWORD_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;

/// Default Argon2 time cost (passes over memory).
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = Params::DEFAULT_T_COST;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const SALT_LEN: usize = 16;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwerty123", "qwertyuiop", "iloveyou", "11111111", "abc12345", "letmein1",
    "welcome1", "admin123", "passw0rd", "football", "baseball", "sunshine",
];

/// Produces and checks Argon2id password hashes in PHC string format.
///
/// The cost parameters travel with each hash, so hashes made with other
/// settings still verify.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_MEMORY_KIB, DEFAULT_PASSWORD_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Creates a hasher; costs below the Argon2 minimums are raised to them.
    pub fn new(memory_kib: u32, iterations: u32) -> Self {
        let params = Params::new(
            memory_kib.max(Params::MIN_M_COST),
            iterations.max(Params::MIN_T_COST),
            Params::DEFAULT_P_COST,
            None,
        )
        .unwrap_or_default();
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let bytes: [u8; SALT_LEN] = rand::rng().random();
        let salt = SaltString::encode_b64(&bytes)
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))?;
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Checks a password against a PHC-encoded hash.
    pub fn verify(&self, password: &str, encoded: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(encoded).map_err(|_| AuthError::MalformedPasswordHash)?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::MalformedPasswordHash),
        }
    }
}

/// Checks a candidate password against the strength rules.
///
/// Returns every failed rule's message.
pub fn check_strength(password: &str, username: &str) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        problems.push("The password is too similar to the username.".to_string());
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        problems.push("This password is too common.".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}
