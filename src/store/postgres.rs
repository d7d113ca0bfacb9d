use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, Duplicate, NewUser, User, VerificationCode};

const USER_COLUMNS: &str =
    "id, full_name, username, email, password_hash, birthday, is_admin, created_at";

fn duplicate_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(c) if c.contains("email") => "Email already registered",
        Some(c) if c.contains("username") => "Username already taken",
        _ => "Account already exists",
    }
}

/// Unique index violations become [`Duplicate`]; anything else keeps its context.
fn user_write_error(err: sqlx::Error, what: &'static str) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Duplicate(duplicate_message(db.constraint()).to_string()).into()
        }
        _ => anyhow::Error::new(err).context(what),
    }
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_user_where(&self, clause: &str, value: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find user by id")?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.fetch_user_where("email = $1", email)
            .await
            .context("find user by email")
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        self.fetch_user_where("username = $1", username)
            .await
            .context("find user by username")
    }

    async fn find_user_by_login(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        self.fetch_user_where("email = $1 OR username = $1", identifier)
            .await
            .context("find user by login")
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.db)
            .await
            .context("list users")?;
        Ok(users)
    }

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (full_name, username, email, password_hash, birthday)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.full_name)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.birthday)
            .fetch_one(&self.db)
            .await
            .map_err(|e| user_write_error(e, "insert user"))?;
        Ok(created)
    }

    async fn update_user(&self, user: &User) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            UPDATE users
               SET full_name = $2, username = $3, email = $4, password_hash = $5, birthday = $6
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.full_name)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.birthday)
            .fetch_one(&self.db)
            .await
            .map_err(|e| user_write_error(e, "update user"))?;
        Ok(updated)
    }

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
            .bind(email)
            .bind(password_hash)
            .execute(&self.db)
            .await
            .context("update password hash")?;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_codes_for(&self, email: &str) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM verification_codes WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await
            .context("delete verification codes")?;
        Ok(res.rows_affected())
    }

    async fn insert_code(&self, email: &str, code: &str) -> anyhow::Result<VerificationCode> {
        let row = sqlx::query_as::<_, VerificationCode>(
            r#"
            INSERT INTO verification_codes (email, code)
            VALUES ($1, $2)
            RETURNING email, code, created_at
            "#,
        )
        .bind(email)
        .bind(code)
        .fetch_one(&self.db)
        .await
        .context("insert verification code")?;
        Ok(row)
    }

    async fn find_code(&self, email: &str, code: &str) -> anyhow::Result<Option<VerificationCode>> {
        let row = sqlx::query_as::<_, VerificationCode>(
            r#"
            SELECT email, code, created_at
              FROM verification_codes
             WHERE email = $1 AND code = $2
            "#,
        )
        .bind(email)
        .bind(code)
        .fetch_optional(&self.db)
        .await
        .context("find verification code")?;
        Ok(row)
    }

    async fn delete_code(&self, email: &str, code: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM verification_codes WHERE email = $1 AND code = $2")
            .bind(email)
            .bind(code)
            .execute(&self.db)
            .await
            .context("delete verification code")?;
        Ok(res.rows_affected() > 0)
    }
}
