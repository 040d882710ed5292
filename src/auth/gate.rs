//! Authentication decision logic.
//!
//! Checks run in a fixed order and the first failure is the one reported:
//! credentials, session presence, session expiry, request freshness,
//! signature.

use crate::auth::context::AccessContext;
use crate::auth::verify::{signing_string, verify_signature, SignatureScheme};
use crate::error::AuthError;
use crate::storage::SessionStore;

/// Gate settings taken from configuration at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatePolicy {
    /// Maximum request age in seconds. `0` disables the freshness check.
    pub access_expire_secs: u64,
    pub scheme: SignatureScheme,
}

/// Identity of a request that passed the gate.
///
/// Inserted into request extensions for downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub session_id: String,
    pub expire_at: i64,
}

/// Run every check against `ctx`, using `now` (unix seconds) for all of them.
pub async fn authenticate<S>(
    store: &S,
    policy: &GatePolicy,
    ctx: &AccessContext,
    now: i64,
) -> Result<AuthenticatedSession, AuthError>
where
    S: SessionStore,
{
    let session = store
        .lookup(&ctx.session_id)
        .await?
        .ok_or(AuthError::NotAuthenticated)?;

    if session.is_expired(now) {
        return Err(AuthError::SessionExpired);
    }

    if is_stale(policy.access_expire_secs, ctx.timestamp, now) {
        return Err(AuthError::RequestExpired);
    }

    let token = store
        .signing_token(&ctx.session_id)
        .await?
        .ok_or(AuthError::SignatureMismatch)?;

    let message = signing_string(&ctx.path, &ctx.query, &token, &ctx.timestamp_raw);
    if !verify_signature(policy.scheme, &token, &message, &ctx.signature) {
        return Err(AuthError::SignatureMismatch);
    }

    Ok(AuthenticatedSession {
        session_id: session.session_id,
        expire_at: session.expire_at,
    })
}

fn is_stale(max_age_secs: u64, timestamp: i64, now: i64) -> bool {
    if max_age_secs == 0 {
        return false;
    }
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
    now.saturating_sub(timestamp) >= max_age
}
