use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use std::sync::Arc;

/// HashingService
///
/// The password-hashing collaborator. The core only needs "raw password in,
/// opaque hash out"; the trait lets tests swap the real Argon2 implementation
/// for a deterministic mock.
pub trait HashingService: Send + Sync {
    fn hash(&self, raw_password: &str) -> Result<String, String>;
}

/// HasherState
///
/// The concrete type used to share the hashing service across the application
/// state.
pub type HasherState = Arc<dyn HashingService>;

/// Argon2Hasher
///
/// Production implementation using Argon2id with a per-password random salt.
#[derive(Clone, Default)]
pub struct Argon2Hasher;

impl HashingService for Argon2Hasher {
    fn hash(&self, raw_password: &str) -> Result<String, String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(raw_password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| e.to_string())
    }
}

/// MockHasher
///
/// Deterministic stand-in for tests: no salt, no key derivation, so assertions
/// can inspect the stored value.
#[derive(Clone)]
pub struct MockHasher {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockHasher {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl HashingService for MockHasher {
    fn hash(&self, raw_password: &str) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Hasher Error: simulation requested".to_string());
        }
        Ok(format!("hashed::{}", raw_password))
    }
}
