//! Session storage.
//!
//! The auth gate only reads sessions. Records are written by the login
//! flow, which lives outside this crate.

pub mod memory;
pub mod session;

pub use memory::MemorySessionStore;
pub use session::RedisSessionStore;

use crate::models::SessionRecord;
use std::future::Future;

/// Errors raised by a session store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt session record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read-only view of the session store.
pub trait SessionStore: Clone + Send + Sync + 'static {
    /// Fetch the session record for `session_id`, if one exists.
    fn lookup(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<SessionRecord>, StoreError>> + Send;

    /// Fetch the signing token bound to `session_id`, if one exists.
    fn signing_token(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        async move {
            Ok(self
                .lookup(session_id)
                .await?
                .map(|record| record.signing_token))
        }
    }
}
