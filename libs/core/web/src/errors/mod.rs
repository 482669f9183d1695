//! The error normalizer.
//!
//! Every failure path in the HTTP layer is expressed as an [`ApiError`]
//! and rendered as one canonical JSON envelope:
//!
//! ```json
//! {
//!   "success": false,
//!   "error": { "message": "...", "type": "..." },
//!   "meta": { "status_code": 404, "path": "/api/users/", "method": "GET", "view": "user_list" }
//! }
//! ```
//!
//! Handlers never format their own error bodies; they return `ApiError`
//! (or a domain error convertible into it) and the [`normalize_errors`]
//! middleware stamps request metadata onto the rendered envelope.

pub mod normalize;

pub use normalize::{normalize_errors, NormalizeConfig};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;

/// Field-scoped or flat validation messages.
///
/// Serializes either as `{"field": ["msg", ...]}` or as `["msg", ...]`,
/// matching how validation errors surface from body validation versus
/// store-level checks.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ValidationMessage {
    Fields(BTreeMap<String, Vec<String>>),
    List(Vec<String>),
}

/// Canonical error taxonomy for the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found.")]
    NotFound,

    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    #[error("{0}")]
    Unauthorized(String),

    #[error("validation failed")]
    Validation(ValidationMessage),

    #[error(transparent)]
    Internal(#[from] eyre::Report),
}

impl ApiError {
    /// Validation error scoped to a single input field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), vec![message.into()]);
        ApiError::Validation(ValidationMessage::Fields(fields))
    }

    /// Validation error without a field to attach to.
    pub fn flat(messages: Vec<String>) -> Self {
        ApiError::Validation(ValidationMessage::List(messages))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    /// Collect `validator` derive output into a field-scoped error.
    pub fn from_validation_errors(errors: &validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value ({}).", e.code))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::Validation(ValidationMessage::Fields(fields))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The exception kind name exposed as `error.type`.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound => "NotFound",
            ApiError::PermissionDenied => "PermissionDenied",
            ApiError::Unauthorized(_) => "AuthenticationError",
            ApiError::Validation(_) => "ValidationError",
            ApiError::Internal(_) => "InternalError",
        }
    }

    fn message_value(&self) -> serde_json::Value {
        match self {
            ApiError::Validation(message) => {
                serde_json::to_value(message).unwrap_or_else(|_| "Invalid input.".into())
            }
            ApiError::Internal(_) => "An unexpected error occurred.".into(),
            other => other.to_string().into(),
        }
    }
}

/// The `error` object of the envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    /// A string, a field-error map, or a flat list of messages
    #[schema(value_type = Object)]
    pub message: serde_json::Value,
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw error detail, present on 500s in debug mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The `meta` object of the envelope. Request fields are omitted
/// entirely (not null) when no request context is available.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorMeta {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

/// The uniform wrapper for every error response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
    pub meta: ErrorMeta,
}

/// Snapshot of a normalized error, carried in response extensions so
/// [`normalize_errors`] can re-render the envelope with request metadata.
#[derive(Debug, Clone)]
pub struct NormalizedError {
    pub kind: &'static str,
    pub message: serde_json::Value,
    pub status: StatusCode,
    pub detail: Option<String>,
}

impl NormalizedError {
    pub fn envelope(
        &self,
        path: Option<String>,
        method: Option<String>,
        view: Option<String>,
        expose_detail: bool,
    ) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                message: self.message.clone(),
                kind: self.kind.to_string(),
                detail: if expose_detail { self.detail.clone() } else { None },
            },
            meta: ErrorMeta {
                status_code: self.status.as_u16(),
                path,
                method,
                view,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 500s are always logged with the full error chain, whether or
        // not detail ends up in the payload.
        if let ApiError::Internal(report) = &self {
            tracing::error!(error = ?report, "unhandled error while processing request");
        }

        let normalized = NormalizedError {
            kind: self.kind(),
            message: self.message_value(),
            status: self.status(),
            detail: match &self {
                ApiError::Internal(report) => Some(format!("{report:#}")),
                _ => None,
            },
        };

        // Render a bare envelope immediately; the normalize_errors layer
        // re-renders it with path/method/view when it sees the extension.
        let envelope = normalized.envelope(None, None, None, false);
        let mut response = (normalized.status, Json(envelope)).into_response();
        response.extensions_mut().insert(normalized);
        response
    }
}

/// Router fallback: unknown routes get the normalized 404 envelope.
pub async fn fallback_not_found() -> ApiError {
    ApiError::NotFound
}
