//! In-memory document client
//!
//! This is primarily for development and testing.
//! For production, use MarkLogicClient.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::DocumentClient;
use crate::error::SessionError;

struct StoredDocument {
    collections: Vec<String>,
    content: Value,
}

impl StoredDocument {
    fn in_collection(&self, collection: &str) -> bool {
        self.collections.iter().any(|c| c == collection)
    }
}

/// In-memory document client
///
/// Clones share the same documents, so several stores built over clones of
/// one client see each other's writes.
pub struct MemoryClient {
    documents: Arc<RwLock<HashMap<String, StoredDocument>>>,
}

impl MemoryClient {
    /// Create an empty client
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Total number of documents across all collections
    pub fn document_count(&self) -> usize {
        self.documents.read().len()
    }

    /// URIs of all stored documents
    pub fn uris(&self) -> Vec<String> {
        self.documents.read().keys().cloned().collect()
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryClient {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}

#[async_trait]
impl DocumentClient for MemoryClient {
    async fn read(&self, uri: &str) -> Result<Value, SessionError> {
        self.documents
            .read()
            .get(uri)
            .map(|doc| doc.content.clone())
            .ok_or(SessionError::NotFound)
    }

    async fn write(
        &self,
        uri: &str,
        collections: &[String],
        content: &Value,
    ) -> Result<(), SessionError> {
        let doc = StoredDocument {
            collections: collections.to_vec(),
            content: content.clone(),
        };
        self.documents.write().insert(uri.to_string(), doc);
        Ok(())
    }

    async fn remove(&self, uri: &str) -> Result<(), SessionError> {
        match self.documents.write().remove(uri) {
            Some(_) => Ok(()),
            None => Err(SessionError::NotFound),
        }
    }

    async fn count(&self, collection: &str) -> Result<u64, SessionError> {
        let documents = self.documents.read();
        Ok(documents
            .values()
            .filter(|doc| doc.in_collection(collection))
            .count() as u64)
    }

    async fn remove_all(&self, collection: &str) -> Result<(), SessionError> {
        self.documents
            .write()
            .retain(|_, doc| !doc.in_collection(collection));
        Ok(())
    }
}
