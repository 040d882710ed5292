//! Axum middleware and extractors for signed-session authentication.

use crate::auth::context::AccessContext;
use crate::auth::gate::{authenticate, AuthenticatedSession, GatePolicy};
use crate::config::Config;
use crate::error::AuthError;
use crate::storage::SessionStore;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub config: Arc<Config>,
}

impl<S> AppState<S> {
    pub fn policy(&self) -> GatePolicy {
        self.config.gate_policy()
    }
}

/// Middleware that lets a request through only with a valid signed session.
///
/// Rejections are answered immediately with the `{code, msg}` envelope and
/// HTTP 200. On success the [`AuthenticatedSession`] is added to the request
/// extensions and the inner response is returned untouched.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api/session", get(current_session))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         require_signature::<RedisSessionStore>,
///     ))
///     .with_state(state);
/// ```
pub async fn require_signature<S>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Response
where
    S: SessionStore,
{
    let ctx = match AccessContext::from_request(request.headers(), request.uri()) {
        Ok(ctx) => ctx,
        Err(err) => return reject(err, request.uri().path()),
    };

    // Single clock read for every time-based check of this request
    let now = chrono::Utc::now().timestamp();

    match authenticate(&state.store, &state.policy(), &ctx, now).await {
        Ok(session) => {
            tracing::debug!(
                session_id = %session.session_id,
                path = %ctx.path,
                "Request authenticated"
            );
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => reject(err, &ctx.path),
    }
}

fn reject(err: AuthError, path: &str) -> Response {
    if !matches!(err, AuthError::Store(_)) {
        tracing::warn!(
            action = "auth_rejected",
            reason = err.reason(),
            path = %path,
            "Request rejected"
        );
    }
    err.into_response()
}

/// Extracts the session established by [`require_signature`].
///
/// Fails with `NotAuthenticated` when the route is not behind the gate.
impl<S> FromRequestParts<S> for AuthenticatedSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSession>()
            .cloned()
            .ok_or(AuthError::NotAuthenticated)
    }
}
