//! Session store trait

use async_trait::async_trait;
use crate::error::SessionError;
use crate::session::SessionData;

/// Trait for session storage backends
///
/// This is the store interface express-session expects, with results returned
/// instead of passed to callbacks. Implementations do not retry; every failure
/// is returned to the caller.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Get a session by ID
    ///
    /// Returns None if session doesn't exist
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError>;

    /// Set/replace a session
    async fn set(&self, sid: &str, session: &SessionData) -> Result<(), SessionError>;

    /// Destroy/delete a session
    ///
    /// Destroying a session that doesn't exist succeeds.
    async fn destroy(&self, sid: &str) -> Result<(), SessionError>;

    /// Get the count of all sessions, expired or not
    async fn length(&self) -> Result<usize, SessionError>;

    /// Clear all sessions
    async fn clear(&self) -> Result<(), SessionError>;
}
