//! Persisted session document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::session::SessionData;

/// Document written for every session
///
/// Shape: `{ "sid": string, "session": <string|object>, "expires": ISO-8601 }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Addressing ID (hashed when hashing is enabled)
    pub sid: String,

    /// Serializer output
    pub session: Value,

    /// Advisory expiry; nothing in the store enforces it
    pub expires: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(sid: String, session: Value, expires: DateTime<Utc>) -> Self {
        Self {
            sid,
            session,
            expires,
        }
    }
}

/// URI of the document holding a session: `/{base_uri}/{sid}.json`
pub fn document_uri(sid: &str, base_uri: &str) -> String {
    format!("/{}/{}.json", base_uri, sid)
}

/// Expiry stored with a session
///
/// The cookie's own expiry wins. Browser-session cookies (no expiry) get
/// `now + ttl`.
pub fn compute_expires(session: &SessionData, ttl: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
    match session.cookie.expires {
        Some(expires) => expires,
        None => chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}
