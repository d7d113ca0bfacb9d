use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,             // unique
    pub email: String,                // unique
    pub password_hash: String,        // Argon2 PHC string
    pub birthday: Date,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a user; id, admin flag and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub birthday: Date,
}

/// Short-lived password reset code, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VerificationCode {
    pub email: String,
    pub code: String,
    pub created_at: OffsetDateTime,
}

impl VerificationCode {
    pub fn is_expired(&self, ttl: std::time::Duration, now: OffsetDateTime) -> bool {
        now - self.created_at > time::Duration::seconds(ttl.as_secs() as i64)
    }
}
