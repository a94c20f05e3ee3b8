use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// Which backing store the identity and course data lives in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
        };
        anyhow::ensure!(!jwt.secret.is_empty(), "JWT_SECRET must not be empty");

        let backend = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "postgres".into());
        let store = match backend.as_str() {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            },
            other => anyhow::bail!("unknown STORE_BACKEND {other:?}"),
        };

        Ok(Self { store, jwt })
    }
}
