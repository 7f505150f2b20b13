//! Error types for the access gate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur when querying an access decider.
///
/// These represent infrastructure failures only. Access denial is expressed
/// via [`crate::AccessDecision::Denied`], not as an error variant, so the
/// gate can never mistake an unrelated failure for a denial.
#[derive(Debug, Error)]
pub enum DeciderError {
    /// The decider's backing service is not available.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors raised while compiling role rules at startup.
///
/// Rule compilation happens once during configuration; a request is never
/// evaluated against a partially built rule set.
#[derive(Debug, Error)]
pub enum RulesError {
    /// A compact rule entry could not be parsed.
    #[error("invalid rule entry '{entry}': {detail}")]
    InvalidEntry { entry: String, detail: String },

    /// A path pattern was rejected by the route matcher.
    #[error("invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },
}

/// Errors surfaced by gate extractors.
#[derive(Debug, Error)]
pub enum GateError {
    /// `IdentityContext` was not found in request extensions.
    #[error("identity context not found - access gate not configured")]
    MissingIdentity,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        tracing::error!("gate extractor failed: {self}");
        match self {
            GateError::MissingIdentity => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
