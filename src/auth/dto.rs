use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo_types::{Role, User},
    error::AppError,
    validation::{check_email, check_len},
};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

impl RegisterRequest {
    /// Public registration only hands out student and instructor roles.
    pub fn validate(&self) -> Result<Role, AppError> {
        check_len("username", &self.username, 2, 50)?;
        check_email("email", &self.email)?;
        check_len("password", &self.password, 6, 1024)?;
        match self.role.as_str() {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            _ => Err(AppError::Validation(
                "\"role\" must be one of [student, instructor]".into(),
            )),
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_email("email", &self.email)?;
        check_len("password", &self.password, 6, 1024)
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub msg: &'static str,
    pub saved_object: PublicUser,
}

/// Response returned after login. `token` already carries the `JWT ` scheme.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        }
    }
}
