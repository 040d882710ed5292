//! API route handlers.

pub mod profile;
pub mod session;

use crate::auth::middleware::{require_signature, AppState};
use crate::models::ApiResponse;
use crate::storage::SessionStore;
use axum::{middleware, routing::get, routing::post, Json, Router};

/// GET /health: liveness probe, outside the gate
pub async fn health() -> Json<ApiResponse> {
    Json(ApiResponse::message(crate::models::CODE_SUCCESS, "success"))
}

/// Build the API router with all endpoints.
///
/// Every `/api` route sits behind [`require_signature`].
pub fn api_router<S>(state: AppState<S>) -> Router
where
    S: SessionStore,
{
    let gated = Router::new()
        .route("/api/session", get(session::current_session))
        .route("/api/profile", post(profile::update_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_signature::<S>,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(gated)
        .with_state(state)
}
