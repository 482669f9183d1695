//! JSON extractor with automatic validation using the validator crate.

use crate::errors::ApiError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `validator` derive rules eagerly.
///
/// Malformed bodies and failed validations are rejected with the
/// normalized validation envelope, field-scoped where possible.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct RegisterRequest {
///     #[validate(email(message = "Enter a valid email address."))]
///     email: String,
/// }
///
/// async fn register(ValidatedJson(input): ValidatedJson<RegisterRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::flat(vec![e.body_text()]).into_response())?;

        data.validate()
            .map_err(|e| ApiError::from_validation_errors(&e).into_response())?;

        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, body::Body, http::Request, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Form {
        #[validate(email(message = "Enter a valid email address."))]
        email: String,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|ValidatedJson(form): ValidatedJson<Form>| async move { form.email }),
        )
    }

    async fn post_json(body: &str) -> (u16, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn valid_body_passes_through() {
        let (status, _) = post_json(r#"{"email": "a@example.com"}"#).await;
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn invalid_field_is_scoped() {
        let (status, body) = post_json(r#"{"email": "nope"}"#).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["type"], "ValidationError");
        assert_eq!(body["error"]["message"]["email"][0], "Enter a valid email address.");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let (status, body) = post_json("{not json").await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["type"], "ValidationError");
    }
}
