//! Session payload compatible with express-session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Cookie data structure compatible with express-session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    /// Original max age in milliseconds (as set initially)
    pub original_max_age: Option<i64>,

    /// Expiration time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    /// Secure flag
    #[serde(default)]
    pub secure: bool,

    /// HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,

    /// Cookie path
    #[serde(default = "default_path")]
    pub path: String,

    /// Cookie domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// SameSite attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,

    /// Fields this struct doesn't model (`priority`, `partitioned`, ...),
    /// kept so they survive a round trip
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// SameSite attribute as express-session stores it
///
/// The cookie module accepts `true` (strict), `false` (unset) or a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SameSite {
    Flag(bool),
    Named(String),
}

fn default_http_only() -> bool {
    true
}

fn default_path() -> String {
    "/".to_string()
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self {
            original_max_age: None,
            expires: None,
            secure: false,
            http_only: true,
            path: "/".to_string(),
            domain: None,
            same_site: None,
            extra: HashMap::new(),
        }
    }
}

impl SessionCookie {
    /// Create a new session cookie with the given max age in seconds
    ///
    /// Ages too large to represent saturate instead of overflowing.
    pub fn new(max_age_secs: u64) -> Self {
        let max_age_ms = i64::try_from(max_age_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let expires = chrono::Duration::from_std(std::time::Duration::from_secs(max_age_secs))
            .ok()
            .and_then(|age| Utc::now().checked_add_signed(age))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            original_max_age: Some(max_age_ms),
            expires: Some(expires),
            ..Default::default()
        }
    }

    /// Check if the cookie has expired
    pub fn is_expired(&self) -> bool {
        match self.expires {
            Some(exp) => exp < Utc::now(),
            None => false, // No expiry = browser session
        }
    }
}

/// Session payload as written by express-session
///
/// The store treats everything except `cookie.expires` as opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Cookie information
    #[serde(default)]
    pub cookie: SessionCookie,

    /// Additional session data (flattened at same level as cookie)
    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl SessionData {
    /// Create a new session data with the given max age in seconds
    pub fn new(max_age_secs: u64) -> Self {
        Self {
            cookie: SessionCookie::new(max_age_secs),
            data: HashMap::new(),
        }
    }

    /// Get a value from session data
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in session data
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.to_string(), v);
        }
    }

    /// Remove a value from session data
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Check if session data is empty (no user data)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
