//! Store configuration

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;
use std::time::Duration;

use crate::serializer::{DeserializeFn, SerializeFn};

/// Default session lifetime when the cookie carries no expiry: 14 days
pub const DEFAULT_TTL: Duration = Duration::from_millis(1000 * 60 * 60 * 24 * 14);

/// Characters JavaScript's `encodeURI` escapes
const ENCODE_URI_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Default collection sessions are tagged with
pub const DEFAULT_COLLECTION: &str = "sessions";

/// Salt used when hashing is enabled without an explicit salt
pub const DEFAULT_HASH_SALT: &str = "connect-marklogic";

/// Digest used when hashing is enabled without an explicit algorithm
pub const DEFAULT_HASH_ALGORITHM: &str = "sha1";

/// Configuration for the document session store
///
/// Built once with the `with_*` methods and handed to the store, which
/// resolves the derived values (base URI, serializer, hasher) at construction.
#[derive(Clone)]
pub struct StoreConfig {
    /// MarkLogic REST host (default: "127.0.0.1")
    pub host: String,

    /// MarkLogic REST port (default: 8000)
    pub port: u16,

    /// User for basic authentication (default: "admin")
    pub user: String,

    /// Password for basic authentication (default: "admin")
    pub password: String,

    /// Use https instead of http (default: false)
    pub ssl: bool,

    /// Database to target instead of the app server's default
    pub database: Option<String>,

    /// Collection every session document is tagged with (default: "sessions")
    pub collection: String,

    /// Document URI prefix. Derived from the collection name when None.
    pub base_uri: Option<String>,

    /// Lifetime added to "now" when the session cookie has no expiry
    pub ttl: Duration,

    /// Session ID hashing, disabled when None
    pub hash: Option<HashConfig>,

    /// Force (Some(true)) or disable (Some(false)) plain JSON text storage
    pub stringify: Option<bool>,

    /// Custom session serializer
    pub serialize: Option<SerializeFn>,

    /// Custom document deserializer
    pub deserialize: Option<DeserializeFn>,

    /// Request timeout forwarded to the HTTP client
    pub timeout: Option<Duration>,
}

/// Session ID hashing parameters
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HashConfig {
    /// Salt prepended to the session ID (default: "connect-marklogic")
    pub salt: Option<String>,

    /// Digest name, e.g. "sha1" or "sha256" (default: "sha1")
    pub algorithm: Option<String>,
}

impl HashConfig {
    /// Enable hashing with the default salt and algorithm
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the salt
    pub fn with_salt<S: Into<String>>(mut self, salt: S) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Set the digest algorithm name
    pub fn with_algorithm<S: Into<String>>(mut self, algorithm: S) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    /// Salt with the default applied
    pub fn salt(&self) -> &str {
        self.salt.as_deref().unwrap_or(DEFAULT_HASH_SALT)
    }

    /// Algorithm name with the default applied
    pub fn algorithm(&self) -> &str {
        self.algorithm.as_deref().unwrap_or(DEFAULT_HASH_ALGORITHM)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            user: "admin".to_string(),
            password: "admin".to_string(),
            ssl: false,
            database: None,
            collection: DEFAULT_COLLECTION.to_string(),
            base_uri: None,
            ttl: DEFAULT_TTL,
            hash: None,
            stringify: None,
            serialize: None,
            deserialize: None,
            timeout: None,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl", &self.ssl)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("base_uri", &self.base_uri)
            .field("ttl", &self.ttl)
            .field("hash", &self.hash)
            .field("stringify", &self.stringify)
            .field("serialize", &self.serialize.is_some())
            .field("deserialize", &self.deserialize.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the MarkLogic host (default: "127.0.0.1")
    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    /// Set the MarkLogic REST port (default: 8000)
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the user for basic authentication
    pub fn with_user<S: Into<String>>(mut self, user: S) -> Self {
        self.user = user.into();
        self
    }

    /// Set the password for basic authentication
    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = password.into();
        self
    }

    /// Use https (default: false)
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    /// Target a specific database
    pub fn with_database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the collection name (default: "sessions")
    pub fn with_collection<S: Into<String>>(mut self, collection: S) -> Self {
        self.collection = collection.into();
        self
    }

    /// Override the document URI prefix
    pub fn with_base_uri<S: Into<String>>(mut self, base_uri: S) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Set the default session lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the default session lifetime in milliseconds
    pub fn with_ttl_millis(mut self, ttl_ms: u64) -> Self {
        self.ttl = Duration::from_millis(ttl_ms);
        self
    }

    /// Enable session ID hashing
    pub fn with_hash(mut self, hash: HashConfig) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Force or disable plain JSON text storage of the session
    pub fn with_stringify(mut self, stringify: bool) -> Self {
        self.stringify = Some(stringify);
        self
    }

    /// Use a custom serializer for the session field
    pub fn with_serialize_fn(mut self, serialize: SerializeFn) -> Self {
        self.serialize = Some(serialize);
        self
    }

    /// Use a custom deserializer for stored documents
    pub fn with_deserialize_fn(mut self, deserialize: DeserializeFn) -> Self {
        self.deserialize = Some(deserialize);
        self
    }

    /// Set the HTTP request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the document URI prefix
    ///
    /// An explicit base URI wins. Otherwise whitespace in the collection
    /// name becomes `-` and the result is percent-encoded the way
    /// `encodeURI` does it, so `/` and other URI delimiters are kept.
    pub fn resolve_base_uri(&self) -> String {
        if let Some(base_uri) = &self.base_uri {
            return base_uri.clone();
        }
        let dashed: String = self
            .collection
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect();
        utf8_percent_encode(&dashed, ENCODE_URI_SET).to_string()
    }

    /// Base URL of the MarkLogic REST server
    pub fn server_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}
