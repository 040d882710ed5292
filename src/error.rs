//! Error types and Axum response conversions.
//!
//! Authentication rejections and handler errors are reported inside the
//! `{code, msg}` envelope with HTTP 200. Only infrastructure failures use a
//! non-200 status.

use crate::models::ApiResponse;
use crate::storage::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Application code for malformed or stale requests and bad signatures.
pub const CODE_INVALID_REQUEST: i32 = -1;

/// Application code for missing or expired logins.
pub const CODE_FORBIDDEN: i32 = 403;

/// Application code for internal failures.
pub const CODE_INTERNAL: i32 = 500;

/// Reasons the auth gate rejects a request, in the order they are checked.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing or malformed access headers")]
    MissingCredentials,

    #[error("no session for the given id")]
    NotAuthenticated,

    #[error("session expired")]
    SessionExpired,

    #[error("request timestamp outside the freshness window")]
    RequestExpired,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Application code placed in the response envelope.
    pub fn code(&self) -> i32 {
        match self {
            AuthError::MissingCredentials
            | AuthError::RequestExpired
            | AuthError::SignatureMismatch => CODE_INVALID_REQUEST,
            AuthError::NotAuthenticated | AuthError::SessionExpired => CODE_FORBIDDEN,
            AuthError::Store(_) => CODE_INTERNAL,
        }
    }

    /// Client-facing message. Never includes internal details.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "invalid token",
            AuthError::NotAuthenticated => "not logged in",
            AuthError::SessionExpired => "login expired",
            AuthError::RequestExpired => "request expired",
            AuthError::SignatureMismatch => "signature verification failed",
            AuthError::Store(_) => "internal server error",
        }
    }

    /// Short label used in structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::NotAuthenticated => "not_authenticated",
            AuthError::SessionExpired => "session_expired",
            AuthError::RequestExpired => "request_expired",
            AuthError::SignatureMismatch => "signature_mismatch",
            AuthError::Store(_) => "store_error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Store(err) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %err, "Session store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::OK,
        };

        (status, Json(ApiResponse::message(self.code(), self.message()))).into_response()
    }
}

/// Handler error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (
                StatusCode::OK,
                Json(ApiResponse {
                    code: CODE_INVALID_REQUEST,
                    msg: "validation failed".to_string(),
                    data: Some(errors),
                }),
            )
                .into_response(),
            AppError::BadRequest(msg) => (
                StatusCode::OK,
                Json(ApiResponse::message(CODE_INVALID_REQUEST, msg)),
            )
                .into_response(),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::message(CODE_INTERNAL, "internal server error")),
                )
                    .into_response()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}
