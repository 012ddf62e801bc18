//! Document client trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SessionError;

/// Minimal document database surface the session store needs
///
/// Documents are addressed by URI and tagged with collections. Implementations
/// signal a missing document with [`SessionError::NotFound`]; every other
/// failure is reported as the error it is.
#[async_trait]
pub trait DocumentClient: Send + Sync + 'static {
    /// Read the document at `uri`
    async fn read(&self, uri: &str) -> Result<Value, SessionError>;

    /// Create or fully replace the document at `uri`
    async fn write(
        &self,
        uri: &str,
        collections: &[String],
        content: &Value,
    ) -> Result<(), SessionError>;

    /// Remove the document at `uri`
    async fn remove(&self, uri: &str) -> Result<(), SessionError>;

    /// Number of documents tagged with `collection`
    async fn count(&self, collection: &str) -> Result<u64, SessionError>;

    /// Remove every document tagged with `collection`
    async fn remove_all(&self, collection: &str) -> Result<(), SessionError>;
}
