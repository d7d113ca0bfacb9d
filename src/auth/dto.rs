use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::User;

/// Request body for createUser.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub birthday: String,
}

/// createUser echoes what was submitted, minus the password.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub birthday: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or username.
    #[serde(alias = "email", alias = "username")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
    pub code: String,
}

/// Every field is optional; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub birthday: String,
    pub is_admin: bool,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            username: u.username,
            email: u.email,
            birthday: u.birthday.to_string(),
            is_admin: u.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_accepts_email_or_username_keys() {
        let by_email: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"x"}"#).unwrap();
        assert_eq!(by_email.identifier, "a@b.co");
        let by_name: LoginRequest =
            serde_json::from_str(r#"{"username":"ana","password":"x"}"#).unwrap();
        assert_eq!(by_name.identifier, "ana");
    }

    #[test]
    fn public_user_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Ana Lopez".into(),
            username: "ana".into(),
            email: "ana@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            birthday: time::macros::date!(1990 - 02 - 28),
            is_admin: false,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("\"fullName\":\"Ana Lopez\""));
        assert!(json.contains("\"birthday\":\"1990-02-28\""));
        assert!(!json.contains("argon2"));
    }
}
