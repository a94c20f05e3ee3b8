use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::{JwtKeys, AUTH_SCHEME};
use super::repo_types::Role;
use crate::{error::AppError, state::AppState, store::UserStore};

/// Authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Turns an Authorization header value into a [`Principal`].
///
/// The token only carries id and email, so the role is read from the
/// current user record. A token for a user that no longer exists is rejected.
pub async fn resolve_principal(
    keys: &JwtKeys,
    users: &dyn UserStore,
    header: Option<&str>,
) -> Result<Principal, AppError> {
    let header = header.ok_or(AppError::Unauthenticated("Missing Authorization header"))?;
    let token = header
        .strip_prefix(AUTH_SCHEME)
        .ok_or(AppError::Unauthenticated("Invalid Authorization header"))?;

    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid token");
        AppError::Unauthenticated("Invalid token")
    })?;

    let user = users.find_by_id(claims.id).await?.ok_or_else(|| {
        warn!(user_id = %claims.id, "token references unknown user");
        AppError::Unauthenticated("User not found")
    })?;

    Ok(Principal {
        id: claims.id,
        email: claims.email,
        role: user.role,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        resolve_principal(&state.keys, state.users.as_ref(), header).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password::hash_password, repo_types::NewUser};
    use crate::config::JwtConfig;
    use crate::auth::repo_types::User;
    use crate::store::MemoryUserStore;
    use async_trait::async_trait;

    struct BrokenUserStore;

    #[async_trait]
    impl UserStore for BrokenUserStore {
        async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
            anyhow::bail!("connection reset")
        }

        async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<User>> {
            anyhow::bail!("connection reset")
        }

        async fn insert(&self, _user: NewUser) -> anyhow::Result<User> {
            anyhow::bail!("connection reset")
        }
    }

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "resolver-secret".into(),
        })
    }

    async fn seeded(role: Role) -> (MemoryUserStore, Uuid) {
        let store = MemoryUserStore::default();
        let user = store
            .insert(NewUser {
                username: "ab".into(),
                email: "a@b.com".into(),
                password: hash_password("secret1").unwrap(),
                role,
            })
            .await
            .unwrap();
        (store, user.id)
    }

    #[tokio::test]
    async fn resolves_valid_header_with_current_role() {
        let keys = keys();
        let (store, id) = seeded(Role::Instructor).await;
        let header = format!("JWT {}", keys.issue(id, "a@b.com").unwrap());

        let principal = resolve_principal(&keys, &store, Some(&header)).await.unwrap();
        assert_eq!(principal.id, id);
        assert_eq!(principal.email, "a@b.com");
        assert!(principal.is_instructor());
        assert!(!principal.is_student());
        assert!(!principal.is_admin());
    }

    #[tokio::test]
    async fn rejects_missing_header_and_wrong_scheme() {
        let keys = keys();
        let (store, id) = seeded(Role::Student).await;
        let token = keys.issue(id, "a@b.com").unwrap();

        for header in [None, Some(token.clone()), Some(format!("Bearer {token}"))] {
            let err = resolve_principal(&keys, &store, header.as_deref())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Unauthenticated(_)));
        }
    }

    #[tokio::test]
    async fn rejects_bad_token() {
        let keys = keys();
        let (store, _) = seeded(Role::Student).await;
        let err = resolve_principal(&keys, &store, Some("JWT not.a.token"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated("Invalid token")));
    }

    #[tokio::test]
    async fn rejects_token_for_unknown_user() {
        let keys = keys();
        let store = MemoryUserStore::default();
        let header = format!("JWT {}", keys.issue(Uuid::new_v4(), "gone@b.com").unwrap());
        let err = resolve_principal(&keys, &store, Some(&header))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated("User not found")));
    }

    #[tokio::test]
    async fn store_failure_is_not_unauthenticated() {
        let keys = keys();
        let header = format!("JWT {}", keys.issue(Uuid::new_v4(), "a@b.com").unwrap());
        let err = resolve_principal(&keys, &BrokenUserStore, Some(&header))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn role_change_applies_to_existing_token() {
        let keys = keys();
        let (store, id) = seeded(Role::Student).await;
        let header = format!("JWT {}", keys.issue(id, "a@b.com").unwrap());

        let before = resolve_principal(&keys, &store, Some(&header)).await.unwrap();
        assert!(before.is_student());

        let mut user = store.find_by_id(id).await.unwrap().unwrap();
        user.role = Role::Admin;
        store.put(user).await;

        let after = resolve_principal(&keys, &store, Some(&header)).await.unwrap();
        assert!(after.is_admin());
        assert!(!after.is_student());
    }
}
