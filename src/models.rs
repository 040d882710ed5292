//! Response envelope and storage models.
//!
//! All models use serde for serialization/deserialization.
//! Storage models represent Redis data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// Response Models
// ============================================================================

/// Application code signalling success. Every other code is a failure.
pub const CODE_SUCCESS: i32 = 0;

/// JSON envelope returned by every endpoint.
///
/// Success and failure are distinguished by `code`, not by HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = ()> {
    pub code: i32,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    /// Envelope without a payload.
    pub fn message(code: i32, msg: impl Into<String>) -> Self {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `data`.
    pub fn success(data: T) -> Self {
        ApiResponse {
            code: CODE_SUCCESS,
            msg: "success".to_string(),
            data: Some(data),
        }
    }
}

/// Session info returned to an authenticated caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub expire_at: i64,
}

// ============================================================================
// Storage Models
// ============================================================================

/// Session data as stored in Redis.
///
/// Written by the login flow; this crate only reads it. `expire_at` is an
/// absolute unix timestamp in seconds, `0` meaning the session never expires.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    #[serde(default)]
    pub expire_at: i64,
    pub signing_token: String,
}

impl SessionRecord {
    /// Whether the session is past its expiry instant at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_at > 0 && self.expire_at <= now
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("session_id", &self.session_id)
            .field("expire_at", &self.expire_at)
            .field("signing_token", &"[REDACTED]")
            .finish()
    }
}
