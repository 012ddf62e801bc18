//! # marklogic-session-store
//!
//! Express-session compatible session store that keeps one JSON document per
//! session in MarkLogic.
//!
//! The store implements the five operations an express-session store exposes
//! (`get`, `set`, `destroy`, `length`, `clear`) on top of a pluggable
//! [`DocumentClient`], so sessions written here use the same document layout
//! as the Node.js `connect-marklogic` store.
//!
//! ## Features
//!
//! - **One document per session**: stored at `/{base_uri}/{sid}.json` and
//!   tagged with a collection (default `"sessions"`)
//! - **Advisory expiry**: every document carries an `expires` timestamp taken
//!   from the session cookie, or `now + ttl` (default 14 days)
//! - **Optional session ID hashing**: `hex(digest(salt + sid))` applied to
//!   every operation
//! - **Pluggable serialization**: JSON text (default), structured objects, or
//!   caller-supplied functions
//! - **Client reuse**: stores built over the same `Arc` client share its
//!   connection pool
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marklogic_session_store::{DocumentStore, SessionData, SessionStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), marklogic_session_store::SessionError> {
//!     let store = DocumentStore::new(
//!         StoreConfig::new()
//!             .with_host("127.0.0.1")
//!             .with_port(8000)
//!             .with_collection("sessions"),
//!     )?;
//!
//!     let mut session = SessionData::new(86400);
//!     session.set("user", "alice");
//!     store.set("abc123", &session).await?;
//!
//!     let loaded = store.get("abc123").await?;
//!     assert_eq!(loaded, Some(session));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hash;
pub mod record;
pub mod serializer;
pub mod session;
pub mod store;

pub use client::{DocumentClient, MemoryClient};
pub use config::{HashConfig, StoreConfig};
pub use error::SessionError;
pub use serializer::{JsonSerializer, SessionSerializer, StructuredSerializer};
pub use session::{SameSite, SessionCookie, SessionData};
pub use store::{DocumentStore, SessionStore};

#[cfg(feature = "marklogic")]
pub use client::MarkLogicClient;
