//! Session endpoints.

use crate::auth::gate::AuthenticatedSession;
use crate::models::{ApiResponse, SessionInfo};
use axum::Json;

/// GET /api/session: describe the caller's session
pub async fn current_session(session: AuthenticatedSession) -> Json<ApiResponse<SessionInfo>> {
    Json(ApiResponse::success(SessionInfo {
        session_id: session.session_id,
        expire_at: session.expire_at,
    }))
}
