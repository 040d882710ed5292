//! Redis-backed session store.
//!
//! Redis key pattern:
//! - `{prefix}auth:{session_id}`: session record (JSON)
//!
//! The record carries the signing token, so the JSON string is wrapped in
//! `Zeroizing` and cleared from application memory once decoded.

use super::{SessionStore, StoreError};
use crate::models::SessionRecord;
use redis::AsyncCommands;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Session store reading JSON records from Redis.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    prefix: Arc<str>,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, prefix: &str) -> Self {
        RedisSessionStore {
            client,
            prefix: Arc::from(prefix),
        }
    }

    /// Redis key holding the record for `session_id`.
    pub fn session_key(&self, session_id: &str) -> String {
        format!("{}auth:{}", self.prefix, session_id)
    }
}

impl SessionStore for RedisSessionStore {
    async fn lookup(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        get_session(&mut con, &self.session_key(session_id)).await
    }
}

/// Read and decode the session stored under `key`.
pub async fn get_session<C>(con: &mut C, key: &str) -> Result<Option<SessionRecord>, StoreError>
where
    C: AsyncCommands,
{
    let json: Option<String> = con.get(key).await?;

    match json {
        Some(data) => {
            let zeroizing_data = Zeroizing::new(data);
            let session = serde_json::from_str(&zeroizing_data)?;
            Ok(Some(session))
        }
        None => Ok(None),
    }
}

/// Write a session record under `key`.
///
/// The gate never writes sessions; this is used only by fixtures seeding
/// Redis in the layout the gate reads. A record with a positive `expire_at`
/// also gets a Redis TTL so it is evicted after it lapses.
pub async fn store_session<C>(
    con: &mut C,
    key: &str,
    session: &SessionRecord,
    now: i64,
) -> Result<(), StoreError>
where
    C: AsyncCommands,
{
    let json = Zeroizing::new(serde_json::to_string(session)?);

    match session_ttl(session.expire_at, now) {
        Some(ttl) => con.set_ex::<_, _, ()>(key, json.as_str(), ttl).await?,
        None => con.set::<_, _, ()>(key, json.as_str()).await?,
    }
    Ok(())
}

/// Seconds until `expire_at`, at least 1. `None` for sessions that never expire.
fn session_ttl(expire_at: i64, now: i64) -> Option<u64> {
    if expire_at <= 0 {
        return None;
    }
    Some(expire_at.saturating_sub(now).max(1) as u64)
}
