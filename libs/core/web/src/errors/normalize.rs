//! Middleware half of the error normalizer.
//!
//! [`ApiError::into_response`] renders a bare envelope (no request
//! context, detail never exposed) and stashes a [`NormalizedError`] in
//! the response extensions. This layer re-renders the envelope with
//! `meta.path`, `meta.method` and `meta.view`, and — in debug mode
//! only — attaches the raw detail to 500s.

use super::NormalizedError;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

/// Configuration for [`normalize_errors`].
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    debug: bool,
    /// Route template -> handler name, used to fill `meta.view`.
    views: &'static [(&'static str, &'static str)],
}

impl NormalizeConfig {
    pub fn new(debug: bool) -> Self {
        Self { debug, views: &[] }
    }

    pub fn with_views(mut self, views: &'static [(&'static str, &'static str)]) -> Self {
        self.views = views;
        self
    }

    fn view_for(&self, route: &str) -> Option<&'static str> {
        self.views
            .iter()
            .find(|(template, _)| *template == route)
            .map(|(_, name)| *name)
    }
}

/// Stamp request metadata onto normalized error responses.
///
/// Apply with `axum::middleware::from_fn_with_state` on the outermost
/// router so every handler (and the 404 fallback) passes through it.
pub async fn normalize_errors(
    State(config): State<NormalizeConfig>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string());

    let response = next.run(request).await;

    let Some(normalized) = response.extensions().get::<NormalizedError>().cloned() else {
        return response;
    };

    let view = config
        .view_for(route.as_deref().unwrap_or(&path))
        .map(str::to_string);

    let envelope = normalized.envelope(Some(path), Some(method), view, config.debug);
    (normalized.status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{fallback_not_found, ApiError};
    use axum::{body::to_bytes, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    fn app(config: NormalizeConfig) -> Router {
        Router::new()
            .route("/boom", get(|| async { Err::<(), _>(ApiError::Internal(eyre::eyre!("kaput"))) }))
            .route("/missing", get(|| async { Err::<(), _>(ApiError::NotFound) }))
            .fallback(fallback_not_found)
            .layer(from_fn_with_state(config, normalize_errors))
    }

    async fn get_json(app: Router, path: &str) -> (u16, serde_json::Value) {
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(path)
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn meta_carries_path_and_method() {
        let config = NormalizeConfig::new(false).with_views(&[("/missing", "missing_things")]);
        let (status, body) = get_json(app(config), "/missing").await;
        assert_eq!(status, 404);
        assert_eq!(body["meta"]["path"], "/missing");
        assert_eq!(body["meta"]["method"], "GET");
        assert_eq!(body["meta"]["view"], "missing_things");
    }

    #[tokio::test]
    async fn unknown_route_is_normalized_without_view() {
        let (status, body) = get_json(app(NormalizeConfig::new(false)), "/nope").await;
        assert_eq!(status, 404);
        assert_eq!(body["error"]["message"], "Not found.");
        assert!(body["meta"].get("view").is_none());
    }

    #[tokio::test]
    async fn detail_exposed_only_in_debug() {
        let (status, body) = get_json(app(NormalizeConfig::new(false)), "/boom").await;
        assert_eq!(status, 500);
        assert_eq!(body["error"]["message"], "An unexpected error occurred.");
        assert!(body["error"].get("detail").is_none());

        let (_, body) = get_json(app(NormalizeConfig::new(true)), "/boom").await;
        assert!(body["error"]["detail"].as_str().unwrap().contains("kaput"));
    }
}
