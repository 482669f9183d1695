//! Liveness and readiness endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use serde_json::{json, Value};

pub fn router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(db)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness requires a live database round trip.
async fn ready(State(db): State<DatabaseConnection>) -> (StatusCode, Json<Value>) {
    let probe = db
        .execute_raw(Statement::from_string(DbBackend::Postgres, "SELECT 1"))
        .await;

    match probe {
        Ok(_) => (StatusCode::OK, Json(json!({"ready": true}))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"ready": false})),
            )
        }
    }
}
