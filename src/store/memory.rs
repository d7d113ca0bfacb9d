//! In-memory store used by the test suite.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{CredentialStore, Duplicate, NewUser, User, VerificationCode};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    codes: RwLock<Vec<VerificationCode>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backdate every code for an email (for expiry tests).
    pub fn age_codes(&self, email: &str, by: time::Duration) {
        for c in self.codes.write().unwrap().iter_mut() {
            if c.email == email {
                c.created_at -= by;
            }
        }
    }

    pub fn codes_for(&self, email: &str) -> Vec<String> {
        self.codes
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.email == email)
            .map(|c| c.code.clone())
            .collect()
    }

    pub fn code_count(&self, email: &str) -> usize {
        self.codes_for(email).len()
    }

    fn find_by<F: Fn(&User) -> bool>(&self, pred: F) -> Option<User> {
        self.users.read().unwrap().values().find(|u| pred(u)).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.find_by(|u| u.email == email))
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self.find_by(|u| u.username == username))
    }

    async fn find_user_by_login(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        Ok(self.find_by(|u| u.email == identifier || u.username == identifier))
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn insert_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.email == new.email) {
            return Err(Duplicate("Email already registered".into()).into());
        }
        if users.values().any(|u| u.username == new.username) {
            return Err(Duplicate("Username already taken".into()).into());
        }
        let user = User {
            id: Uuid::new_v4(),
            full_name: new.full_name,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            birthday: new.birthday,
            is_admin: false,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> anyhow::Result<User> {
        let mut users = self.users.write().unwrap();
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| anyhow::anyhow!("no user with id {}", user.id))?;
        stored.full_name = user.full_name.clone();
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.birthday = user.birthday;
        Ok(stored.clone())
    }

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> anyhow::Result<()> {
        for u in self.users.write().unwrap().values_mut() {
            if u.email == email {
                u.password_hash = password_hash.to_string();
            }
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.users.write().unwrap().remove(&id).is_some())
    }

    async fn delete_codes_for(&self, email: &str) -> anyhow::Result<u64> {
        let mut codes = self.codes.write().unwrap();
        let before = codes.len();
        codes.retain(|c| c.email != email);
        Ok((before - codes.len()) as u64)
    }

    async fn insert_code(&self, email: &str, code: &str) -> anyhow::Result<VerificationCode> {
        let row = VerificationCode {
            email: email.to_string(),
            code: code.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.codes.write().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_code(&self, email: &str, code: &str) -> anyhow::Result<Option<VerificationCode>> {
        Ok(self
            .codes
            .read()
            .unwrap()
            .iter()
            .find(|c| c.email == email && c.code == code)
            .cloned())
    }

    async fn delete_code(&self, email: &str, code: &str) -> anyhow::Result<bool> {
        let mut codes = self.codes.write().unwrap();
        let before = codes.len();
        codes.retain(|c| !(c.email == email && c.code == code));
        Ok(codes.len() != before)
    }
}
