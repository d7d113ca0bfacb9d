//! Persistence for user accounts and password reset codes.

pub mod models;
pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

pub use models::{NewUser, User, VerificationCode};
pub use postgres::PgStore;

/// A write collided with a unique email or username.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Duplicate(pub String);

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    /// Look a user up by email or username.
    async fn find_user_by_login(&self, identifier: &str) -> anyhow::Result<Option<User>>;

    async fn list_users(&self) -> anyhow::Result<Vec<User>>;

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<User>;

    /// Overwrite the mutable columns of an existing user.
    async fn update_user(&self, user: &User) -> anyhow::Result<User>;

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> anyhow::Result<()>;

    /// Returns whether a row was removed.
    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn delete_codes_for(&self, email: &str) -> anyhow::Result<u64>;

    async fn insert_code(&self, email: &str, code: &str) -> anyhow::Result<VerificationCode>;

    async fn find_code(&self, email: &str, code: &str) -> anyhow::Result<Option<VerificationCode>>;

    async fn delete_code(&self, email: &str, code: &str) -> anyhow::Result<bool>;
}
