//! Per-request authentication context extracted from headers and URI.

use crate::error::AuthError;
use axum::http::{HeaderMap, Uri};

/// Header carrying the client signature.
pub const HEADER_SIGN: &str = "access-sign";
/// Header carrying the request timestamp (unix seconds).
pub const HEADER_TIME: &str = "access-time";
/// Header carrying the session identifier.
pub const HEADER_UUID: &str = "access-uuid";

/// Query parameters in the order they appeared on the wire.
///
/// Behaves like an insertion-ordered map: setting an existing key replaces
/// its value in place, new keys go to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Decode a raw `application/x-www-form-urlencoded` query string.
    ///
    /// A repeated key keeps the position of its first occurrence and the
    /// value of its last.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = QueryParams::default();
        if let Some(raw) = raw {
            for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
                params.set(&key, &value);
            }
        }
        params
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = QueryParams::default();
        for (key, value) in pairs {
            params.set(key.as_ref(), value.as_ref());
        }
        params
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove the first parameter in wire order. No-op when empty.
    ///
    /// Compatibility quirk of the signing protocol: clients exclude the
    /// leading query parameter from what they sign, whatever its name.
    pub fn drop_leading_parameter(&mut self) {
        if !self.0.is_empty() {
            self.0.remove(0);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Authentication inputs of a single request.
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub signature: String,
    /// `Access-Time` exactly as sent; this is the text that gets signed.
    pub timestamp_raw: String,
    pub timestamp: i64,
    pub session_id: String,
    pub path: String,
    pub query: QueryParams,
}

impl AccessContext {
    /// Extract the context from request headers and URI.
    ///
    /// Fails with `MissingCredentials` if any access header is absent, empty,
    /// not valid UTF-8, or if the timestamp is not an integer.
    pub fn from_request(headers: &HeaderMap, uri: &Uri) -> Result<Self, AuthError> {
        let signature = required_header(headers, HEADER_SIGN)?;
        let timestamp_raw = required_header(headers, HEADER_TIME)?;
        let session_id = required_header(headers, HEADER_UUID)?;

        let timestamp = timestamp_raw
            .parse::<i64>()
            .map_err(|_| AuthError::MissingCredentials)?;

        Ok(AccessContext {
            signature,
            timestamp_raw,
            timestamp,
            session_id,
            path: uri.path().to_string(),
            query: QueryParams::parse(uri.query()),
        })
    }
}

fn required_header(headers: &HeaderMap, name: &str) -> Result<String, AuthError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::MissingCredentials)
}
