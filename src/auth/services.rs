use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::{JwtKeys, AUTH_SCHEME},
        password::{hash_password_blocking, verify_password_blocking},
        repo_types::{NewUser, User},
    },
    error::AppError,
    store::UserStore,
};

/// Validates, rejects a taken email, hashes the password once and stores the user.
///
/// The email check and the insert are two separate store calls, so two
/// concurrent registrations of the same address can both succeed.
pub async fn register_user(
    users: &dyn UserStore,
    mut payload: RegisterRequest,
) -> Result<User, AppError> {
    payload.email = payload.email.trim().to_lowercase();
    let role = payload.validate()?;

    if users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::DuplicateIdentity);
    }

    let password = hash_password_blocking(payload.password)
        .await
        .map_err(AppError::Internal)?;

    let user = users
        .insert(NewUser {
            username: payload.username,
            email: payload.email,
            password,
            role,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok(user)
}

/// Checks credentials and returns the user with a `JWT `-prefixed token.
pub async fn login_user(
    users: &dyn UserStore,
    keys: &JwtKeys,
    mut payload: LoginRequest,
) -> Result<(User, String), AppError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    let Some(user) = users.find_by_email(&payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthenticated("Invalid credentials"));
    };

    if !verify_password_blocking(payload.password, user.password_hash.clone()).await {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthenticated("Invalid credentials"));
    }

    let token = keys.issue(user.id, &user.email).map_err(AppError::Internal)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, format!("{AUTH_SCHEME}{token}")))
}
