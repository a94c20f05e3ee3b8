use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::config::JwtConfig;

/// Scheme prefix clients put in front of the token in the Authorization header.
pub const AUTH_SCHEME: &str = "JWT ";

/// JWT payload. Carries identity only; the role is looked up on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub iat: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid token")]
pub struct TokenInvalid;

struct Inner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Signs and verifies session tokens with the process-wide HMAC secret.
///
/// Tokens carry no expiry: they stay valid until the secret changes.
#[derive(Clone)]
pub struct JwtKeys {
    inner: Arc<Inner>,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        Self {
            inner: Arc::new(Inner {
                encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
                decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
                validation,
            }),
        }
    }

    pub fn issue(&self, id: Uuid, email: &str) -> anyhow::Result<String> {
        let claims = Claims {
            id,
            email: email.to_string(),
            iat: OffsetDateTime::now_utc().unix_timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding)?;
        debug!(user_id = %id, "jwt signed");
        Ok(token)
    }

    /// Any decoding or signature problem collapses to [`TokenInvalid`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenInvalid> {
        let data = decode::<Claims>(token, &self.inner.decoding, &self.inner.validation).map_err(
            |e| {
                debug!(error = %e, "jwt rejected");
                TokenInvalid
            },
        )?;
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}
