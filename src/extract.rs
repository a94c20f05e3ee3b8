//! Body and path extractors whose rejections go through [`AppError`], so a
//! malformed request gets the same 400 `{"success":false,...}` body as any
//! other validation failure.

use axum::{
    async_trait,
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;

fn json_rejection(rejection: JsonRejection) -> AppError {
    let text = rejection.body_text();
    debug!(%text, "json body rejected");

    if let Some(field) = text
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return AppError::Validation(format!("\"{field}\" is required"));
    }
    if text.contains("invalid type") {
        return AppError::Validation("Invalid field type in request".into());
    }
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::Validation("Missing 'Content-Type: application/json' header".into());
    }
    AppError::Validation("Invalid request body".into())
}

/// JSON body that must be present and well-formed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(ValidJson(value))
    }
}

/// JSON body that may be left out. An empty body yields `None`; anything
/// else has to parse.
#[derive(Debug, Clone, Default)]
pub struct MaybeJson<T>(pub Option<T>);

#[async_trait]
impl<T, S> FromRequest<S> for MaybeJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::Validation("Invalid request body".into()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(MaybeJson(None));
        }
        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(json_rejection)?;
        Ok(MaybeJson(Some(value)))
    }
}

/// Path parameters; a value that does not parse is a 400, not axum's plain text.
#[derive(Debug, Clone, Copy)]
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ValidPath(value)),
            Err(PathRejection::FailedToDeserializePathParams(e)) => {
                debug!(error = %e.body_text(), "path rejected");
                Err(AppError::Validation("Invalid path parameter".into()))
            }
            Err(other) => Err(AppError::Internal(anyhow::anyhow!(other.body_text()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        id: Option<Uuid>,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_json_accepts_well_formed_body() {
        let ValidJson(body) = ValidJson::<Sample>::from_request(json_request(r#"{"name":"ab"}"#), &())
            .await
            .unwrap();
        assert_eq!(body.name, "ab");
        assert_eq!(body.id, None);
    }

    #[tokio::test]
    async fn valid_json_rejections_are_validation_errors() {
        let err = ValidJson::<Sample>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(message(err), "\"name\" is required");

        let err = ValidJson::<Sample>::from_request(json_request(r#"{"name":5}"#), &())
            .await
            .unwrap_err();
        assert_eq!(message(err), "Invalid field type in request");

        let err = ValidJson::<Sample>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(message(err), "Invalid request body");

        let bare = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let err = ValidJson::<Sample>::from_request(bare, &()).await.unwrap_err();
        assert_eq!(
            message(err),
            "Missing 'Content-Type: application/json' header"
        );
    }

    #[tokio::test]
    async fn maybe_json_is_none_only_for_empty_body() {
        let empty = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let MaybeJson(body) = MaybeJson::<Sample>::from_request(empty, &()).await.unwrap();
        assert!(body.is_none());

        let MaybeJson(body) = MaybeJson::<Sample>::from_request(json_request(r#"{"name":"ab"}"#), &())
            .await
            .unwrap();
        assert_eq!(body.unwrap().name, "ab");

        let err = MaybeJson::<Sample>::from_request(
            json_request(r#"{"name":"ab","id":"not-a-uuid"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
