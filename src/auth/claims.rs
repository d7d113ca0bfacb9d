use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token payload: the user's identity plus registered JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}
