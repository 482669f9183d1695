//! API routes module

pub mod health;

use axum::middleware::from_fn_with_state;
use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use web_core::{fallback_not_found, normalize_errors, NormalizeConfig};

use crate::state::AppState;

/// Assemble the full application router.
///
/// The error normalizer is the outermost layer so every response,
/// including the 404 fallback and the docs routes, passes through it.
pub fn routes(state: AppState, db: DatabaseConnection, debug: bool) -> Router {
    let normalize = NormalizeConfig::new(debug).with_views(domain_accounts::VIEWS);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url(
            "/api-docs/openapi.json",
            crate::openapi::ApiDoc::openapi(),
        ))
        .merge(health::router(db))
        .nest("/api", domain_accounts::router(state))
        .fallback(fallback_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(from_fn_with_state(normalize, normalize_errors))
}
