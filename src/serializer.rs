//! Session serialization strategies
//!
//! `serialize` turns a session into the `session` field of the stored record.
//! `deserialize` receives the whole stored document and recovers the session.

use serde_json::Value;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::SessionError;
use crate::session::SessionData;

/// Custom serialize function
pub type SerializeFn = Arc<dyn Fn(&SessionData) -> Result<Value, SessionError> + Send + Sync>;

/// Custom deserialize function
pub type DeserializeFn = Arc<dyn Fn(&Value) -> Result<SessionData, SessionError> + Send + Sync>;

/// Converts sessions to and from stored documents
///
/// Both directions must be pure. An error from `serialize` aborts the write
/// before any request is made.
pub trait SessionSerializer: Send + Sync + 'static {
    fn serialize(&self, session: &SessionData) -> Result<Value, SessionError>;

    fn deserialize(&self, document: &Value) -> Result<SessionData, SessionError>;
}

/// Stores the session as JSON text (the default)
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl SessionSerializer for JsonSerializer {
    fn serialize(&self, session: &SessionData) -> Result<Value, SessionError> {
        Ok(Value::String(serde_json::to_string(session)?))
    }

    fn deserialize(&self, document: &Value) -> Result<SessionData, SessionError> {
        match document.get("session") {
            Some(Value::String(text)) => Ok(serde_json::from_str(text)?),
            Some(other) => Err(SessionError::SerializationError(format!(
                "expected session text, found {}",
                json_type(other)
            ))),
            None => Err(SessionError::SerializationError(
                "document has no session field".to_string(),
            )),
        }
    }
}

/// Stores the session as a JSON object
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuredSerializer;

impl SessionSerializer for StructuredSerializer {
    fn serialize(&self, session: &SessionData) -> Result<Value, SessionError> {
        let value = serde_json::to_value(session)?;
        if !value.is_object() {
            return Err(SessionError::SerializationError(
                "session did not serialize to an object".to_string(),
            ));
        }
        Ok(value)
    }

    fn deserialize(&self, document: &Value) -> Result<SessionData, SessionError> {
        let content = document
            .get("session")
            .or_else(|| document.get("content"))
            .unwrap_or(document);
        match content {
            Value::String(text) => Ok(serde_json::from_str(text)?),
            Value::Object(_) => Ok(serde_json::from_value(content.clone())?),
            other => Err(SessionError::SerializationError(format!(
                "expected session object, found {}",
                json_type(other)
            ))),
        }
    }
}

/// Caller-supplied functions, either half falling back to [`StructuredSerializer`]
#[derive(Clone, Default)]
pub struct CustomSerializer {
    serialize: Option<SerializeFn>,
    deserialize: Option<DeserializeFn>,
}

impl CustomSerializer {
    pub fn new(serialize: Option<SerializeFn>, deserialize: Option<DeserializeFn>) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }
}

impl SessionSerializer for CustomSerializer {
    fn serialize(&self, session: &SessionData) -> Result<Value, SessionError> {
        match &self.serialize {
            Some(f) => f(session),
            None => StructuredSerializer.serialize(session),
        }
    }

    fn deserialize(&self, document: &Value) -> Result<SessionData, SessionError> {
        match &self.deserialize {
            Some(f) => f(document),
            None => StructuredSerializer.deserialize(document),
        }
    }
}

/// Pick the serialization strategy for a configuration
///
/// JSON text is used when `stringify` is set, or when no serialization
/// option was given at all.
pub fn resolve_serializer(config: &StoreConfig) -> Arc<dyn SessionSerializer> {
    let nothing_set =
        config.stringify.is_none() && config.serialize.is_none() && config.deserialize.is_none();
    if config.stringify == Some(true) || nothing_set {
        return Arc::new(JsonSerializer);
    }
    match (&config.serialize, &config.deserialize) {
        (None, None) => Arc::new(StructuredSerializer),
        (serialize, deserialize) => {
            Arc::new(CustomSerializer::new(serialize.clone(), deserialize.clone()))
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
