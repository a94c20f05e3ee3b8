use crate::auth::jwt::JwtKeys;
use crate::auth::repo::PgUserStore;
use crate::config::{AppConfig, JwtConfig, StoreBackend};
use crate::courses::repo::PgCourseStore;
use crate::db;
use crate::store::{CourseStore, MemoryCourseStore, MemoryUserStore, UserStore};
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub keys: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub courses: Arc<dyn CourseStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let (users, courses) = match &config.store {
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let pool = db::connect(database_url, *max_connections).await?;
                db::migrate(&pool).await?;
                (
                    Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>,
                    Arc::new(PgCourseStore::new(pool)) as Arc<dyn CourseStore>,
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                (
                    Arc::new(MemoryUserStore::default()) as Arc<dyn UserStore>,
                    Arc::new(MemoryCourseStore::default()) as Arc<dyn CourseStore>,
                )
            }
        };

        Ok(Self::from_parts(&config.jwt, users, courses))
    }

    pub fn from_parts(
        jwt: &JwtConfig,
        users: Arc<dyn UserStore>,
        courses: Arc<dyn CourseStore>,
    ) -> Self {
        Self {
            keys: JwtKeys::new(jwt),
            users,
            courses,
        }
    }

    pub fn in_memory(secret: &str) -> Self {
        Self::from_parts(
            &JwtConfig {
                secret: secret.into(),
            },
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryCourseStore::default()),
        )
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}
