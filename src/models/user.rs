use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub created_at: Option<String>,
}

/// Insert shape for the user store. The password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; never carries the credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
