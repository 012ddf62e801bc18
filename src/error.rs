//! Session store error types

use std::fmt;

/// Errors that can occur during session store operations
#[derive(Debug)]
pub enum SessionError {
    /// Invalid or missing configuration, raised while constructing a store
    ConfigurationError(String),
    /// Error from the document client
    StoreError(String),
    /// Error during serialization/deserialization
    SerializationError(String),
    /// Invalid session ID format
    InvalidSessionId(String),
    /// Document not found
    ///
    /// Raised by document clients only. The store translates it into an
    /// absent session on `get` and a successful `destroy`.
    NotFound,
    /// HTTP transport error (when marklogic feature is enabled)
    #[cfg(feature = "marklogic")]
    HttpError(reqwest::Error),
}

impl SessionError {
    /// Whether this error is the client's "document not found" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::NotFound)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            SessionError::StoreError(msg) => write!(f, "Session store error: {}", msg),
            SessionError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            SessionError::InvalidSessionId(msg) => write!(f, "Invalid session ID: {}", msg),
            SessionError::NotFound => write!(f, "Document not found"),
            #[cfg(feature = "marklogic")]
            SessionError::HttpError(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "marklogic")]
            SessionError::HttpError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "marklogic")]
impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::HttpError(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SessionError::ConfigurationError("host must not be empty".to_string());
        assert_eq!(err.to_string(), "Configuration error: host must not be empty");
        assert_eq!(SessionError::NotFound.to_string(), "Document not found");
    }

    #[test]
    fn test_json_error_is_serialization_error() {
        let err: SessionError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SessionError::SerializationError(_)));
        assert!(!err.is_not_found());
    }
}
