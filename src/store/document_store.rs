//! Session store backed by a document database
//!
//! Each session is one JSON document:
//! - URI: `/{base_uri}/{sid}.json` (sid hashed first when hashing is enabled)
//! - Content: `{ "sid", "session", "expires" }`
//! - Collection: the configured collection, used by `length` and `clear`

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use super::SessionStore;
use crate::client::DocumentClient;
use crate::config::StoreConfig;
use crate::error::SessionError;
use crate::hash::SidHasher;
use crate::record::{compute_expires, document_uri, SessionRecord};
use crate::serializer::{resolve_serializer, SessionSerializer};
use crate::session::SessionData;

#[cfg(feature = "marklogic")]
use crate::client::MarkLogicClient;

/// Session store backed by a [`DocumentClient`]
///
/// Every operation issues exactly one client call. Concurrent calls for the
/// same session are not serialized here; the database decides who wins.
///
/// # Example
///
/// ```rust,ignore
/// use marklogic_session_store::{DocumentStore, SessionStore, StoreConfig};
///
/// let store = DocumentStore::new(
///     StoreConfig::new()
///         .with_host("ml.internal")
///         .with_collection("web sessions"),
/// )?;
/// let session = store.get("abc123").await?;
/// ```
pub struct DocumentStore<C: DocumentClient> {
    client: Arc<C>,
    collection: String,
    base_uri: String,
    ttl: Duration,
    hasher: Option<SidHasher>,
    serializer: Arc<dyn SessionSerializer>,
}

#[cfg(feature = "marklogic")]
impl DocumentStore<MarkLogicClient> {
    /// Create a store with a new MarkLogic client built from `config`
    pub fn new(config: StoreConfig) -> Result<Self, SessionError> {
        let client = MarkLogicClient::new(&config)?;
        Self::with_client(Arc::new(client), config)
    }
}

impl<C: DocumentClient> DocumentStore<C> {
    /// Create a store over an existing client
    ///
    /// The client can be shared with other stores; connection parameters in
    /// `config` are ignored.
    pub fn with_client(client: Arc<C>, config: StoreConfig) -> Result<Self, SessionError> {
        let hasher = config
            .hash
            .as_ref()
            .map(SidHasher::from_config)
            .transpose()?;

        Ok(Self {
            client,
            base_uri: config.resolve_base_uri(),
            serializer: resolve_serializer(&config),
            collection: config.collection,
            ttl: config.ttl,
            hasher,
        })
    }

    /// The underlying document client
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Collection session documents are tagged with
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Document URI prefix
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// ID a session is stored under (hashed when hashing is enabled)
    pub fn document_id(&self, sid: &str) -> Result<String, SessionError> {
        if sid.is_empty() {
            return Err(SessionError::InvalidSessionId(
                "session ID must not be empty".to_string(),
            ));
        }
        Ok(match &self.hasher {
            Some(hasher) => hasher.hash(sid),
            None => sid.to_string(),
        })
    }

    /// URI of the document holding a session
    pub fn document_uri(&self, sid: &str) -> Result<String, SessionError> {
        Ok(document_uri(&self.document_id(sid)?, &self.base_uri))
    }
}

impl<C: DocumentClient> Clone for DocumentStore<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            collection: self.collection.clone(),
            base_uri: self.base_uri.clone(),
            ttl: self.ttl,
            hasher: self.hasher.clone(),
            serializer: Arc::clone(&self.serializer),
        }
    }
}

#[async_trait]
impl<C: DocumentClient> SessionStore for DocumentStore<C> {
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError> {
        let uri = self.document_uri(sid)?;
        tracing::debug!("Getting session {}", uri);

        let document = match self.client.read(&uri).await {
            Ok(document) => document,
            Err(SessionError::NotFound) => return Ok(None),
            Err(e) => {
                tracing::warn!("Failed to read session {}: {}", uri, e);
                return Err(e);
            }
        };

        // Expired documents are still returned; expiry is advisory
        Ok(Some(self.serializer.deserialize(&document)?))
    }

    async fn set(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        let id = self.document_id(sid)?;
        let uri = document_uri(&id, &self.base_uri);
        tracing::debug!("Setting session {}", uri);

        let payload = self.serializer.serialize(session)?;
        let expires = compute_expires(session, self.ttl, Utc::now());
        let record = SessionRecord::new(id, payload, expires);
        let content = serde_json::to_value(&record)?;

        self.client
            .write(&uri, std::slice::from_ref(&self.collection), &content)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to write session {}: {}", uri, e);
                e
            })
    }

    async fn destroy(&self, sid: &str) -> Result<(), SessionError> {
        let uri = self.document_uri(sid)?;
        tracing::debug!("Destroying session {}", uri);

        match self.client.remove(&uri).await {
            Ok(()) | Err(SessionError::NotFound) => Ok(()),
            Err(e) => {
                tracing::warn!("Failed to remove session {}: {}", uri, e);
                Err(e)
            }
        }
    }

    async fn length(&self) -> Result<usize, SessionError> {
        tracing::debug!("Counting sessions in collection {}", self.collection);
        let count = self.client.count(&self.collection).await.map_err(|e| {
            tracing::warn!("Failed to count sessions in {}: {}", self.collection, e);
            e
        })?;
        usize::try_from(count)
            .map_err(|_| SessionError::StoreError(format!("session count {} overflows usize", count)))
    }

    async fn clear(&self) -> Result<(), SessionError> {
        tracing::debug!("Clearing all sessions in collection {}", self.collection);
        self.client.remove_all(&self.collection).await.map_err(|e| {
            tracing::warn!("Failed to clear sessions in {}: {}", self.collection, e);
            e
        })
    }
}
