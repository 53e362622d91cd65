//! User storage seam.
//!
//! DESIGN
//! ======
//! Persistent user storage is an external collaborator: the rest of the
//! system only sees the `UserRepository` trait. `MemoryUserRepository` is the
//! in-process reference implementation used by the server binary and tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::session::bytes_to_hex;

/// Public user projection. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already in use")]
    DuplicateEmail,
    #[error("storage error: {0}")]
    Storage(String),
}

/// Hash a password for storage and comparison.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user. Fails with [`RepoError::DuplicateEmail`] if the email
    /// is already on record.
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User, RepoError>;

    /// Find a user whose email and password hash both match. `None` reveals
    /// nothing about which of the two was wrong.
    async fn find_by_credentials(&self, email: &str, password_hash: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-memory `UserRepository` implementation.
#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<Mutex<Vec<StoredUser>>>,
}

impl MemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredUser>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User, RepoError> {
        let mut users = self.lock();
        if users.iter().any(|u| u.user.email == email) {
            return Err(RepoError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            email: email.to_owned(),
        };
        users.push(StoredUser { user: user.clone(), password_hash: password_hash.to_owned() });
        Ok(user)
    }

    async fn find_by_credentials(&self, email: &str, password_hash: &str) -> Result<Option<User>, RepoError> {
        let users = self.lock();
        Ok(users
            .iter()
            .find(|u| u.user.email == email && u.password_hash == password_hash)
            .map(|u| u.user.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let users = self.lock();
        Ok(users.iter().find(|u| u.user.id == id).map(|u| u.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.lock();
        Ok(users.iter().find(|u| u.user.email == email).map(|u| u.user.clone()))
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
