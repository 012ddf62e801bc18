//! MarkLogic REST document client
//!
//! Talks to the MarkLogic REST API:
//! - Documents: `/v1/documents?uri=...` (GET, PUT, DELETE)
//! - Collections: `/v1/search?collection=...` (GET with `pageLength=0` to
//!   count, DELETE to remove every document in the collection)

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use super::DocumentClient;
use crate::config::StoreConfig;
use crate::error::SessionError;

const MAX_ERROR_BODY: usize = 500;

/// MarkLogic REST client
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use marklogic_session_store::{MarkLogicClient, StoreConfig};
///
/// let config = StoreConfig::new().with_host("ml.internal").with_port(8010);
/// let client = MarkLogicClient::new(&config)?;
/// ```
#[derive(Clone, Debug)]
pub struct MarkLogicClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
    database: Option<String>,
}

impl MarkLogicClient {
    /// Build a client from the connection parameters of `config`
    ///
    /// No request is sent. Invalid parameters are reported as
    /// [`SessionError::ConfigurationError`].
    pub fn new(config: &StoreConfig) -> Result<Self, SessionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            SessionError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
        })?;
        Self::with_http_client(http, config)
    }

    /// Build a client around an existing `reqwest::Client`
    pub fn with_http_client(http: reqwest::Client, config: &StoreConfig) -> Result<Self, SessionError> {
        if config.host.trim().is_empty() {
            return Err(SessionError::ConfigurationError(
                "host must not be empty".to_string(),
            ));
        }
        if config.port == 0 {
            return Err(SessionError::ConfigurationError(
                "port must not be 0".to_string(),
            ));
        }
        let base_url = config.server_url();
        reqwest::Url::parse(&base_url).map_err(|e| {
            SessionError::ConfigurationError(format!("Invalid server URL {}: {}", base_url, e))
        })?;

        Ok(Self {
            http,
            base_url,
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.user, Some(&self.password));
        match &self.database {
            Some(database) => builder.query(&[("database", database.as_str())]),
            None => builder,
        }
    }

    /// Map a response to NotFound / StoreError / success
    async fn check(response: Response, operation: &str, target: &str) -> Result<Response, SessionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(SessionError::NotFound);
        }

        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY).collect();
        Err(SessionError::StoreError(format!(
            "{} {} failed with HTTP {}: {}",
            operation,
            target,
            status.as_u16(),
            body
        )))
    }

    /// Like [`Self::check`], for `/v1/search`, where a 404 means a bad
    /// endpoint or database rather than a missing document
    async fn check_collection(
        response: Response,
        operation: &str,
        collection: &str,
    ) -> Result<Response, SessionError> {
        let status = response.status();
        match Self::check(response, operation, collection).await {
            Err(SessionError::NotFound) => Err(SessionError::StoreError(format!(
                "{} {} failed with HTTP {}",
                operation,
                collection,
                status.as_u16()
            ))),
            other => other,
        }
    }
}

#[async_trait]
impl DocumentClient for MarkLogicClient {
    async fn read(&self, uri: &str) -> Result<Value, SessionError> {
        let response = self
            .request(Method::GET, "/v1/documents")
            .query(&[("uri", uri), ("format", "json")])
            .send()
            .await?;
        let response = Self::check(response, "read", uri).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn write(
        &self,
        uri: &str,
        collections: &[String],
        content: &Value,
    ) -> Result<(), SessionError> {
        let mut builder = self
            .request(Method::PUT, "/v1/documents")
            .query(&[("uri", uri), ("format", "json")]);
        for collection in collections {
            builder = builder.query(&[("collection", collection.as_str())]);
        }
        let response = builder.json(content).send().await?;
        Self::check(response, "write", uri).await?;
        Ok(())
    }

    async fn remove(&self, uri: &str) -> Result<(), SessionError> {
        let response = self
            .request(Method::DELETE, "/v1/documents")
            .query(&[("uri", uri)])
            .send()
            .await?;
        Self::check(response, "remove", uri).await?;
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64, SessionError> {
        let response = self
            .request(Method::GET, "/v1/search")
            .query(&[
                ("collection", collection),
                ("pageLength", "0"),
                ("format", "json"),
            ])
            .send()
            .await?;
        let response = Self::check_collection(response, "count", collection).await?;
        let body: Value = response.json().await?;
        body.get("total").and_then(Value::as_u64).ok_or_else(|| {
            SessionError::StoreError(format!(
                "count {} returned no total in search response",
                collection
            ))
        })
    }

    async fn remove_all(&self, collection: &str) -> Result<(), SessionError> {
        let response = self
            .request(Method::DELETE, "/v1/search")
            .query(&[("collection", collection)])
            .send()
            .await?;
        Self::check_collection(response, "remove_all", collection).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, SessionStore};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn test_client_from_config() {
        let config = StoreConfig::new()
            .with_host("ml.internal")
            .with_port(8010)
            .with_ssl(true);
        let client = MarkLogicClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://ml.internal:8010");
    }

    #[test]
    fn test_invalid_connection_parameters() {
        let empty_host = MarkLogicClient::new(&StoreConfig::new().with_host(" "));
        assert!(matches!(empty_host, Err(SessionError::ConfigurationError(_))));

        let zero_port = MarkLogicClient::new(&StoreConfig::new().with_port(0));
        assert!(matches!(zero_port, Err(SessionError::ConfigurationError(_))));

        let bad_host = MarkLogicClient::new(&StoreConfig::new().with_host("bad host/"));
        assert!(matches!(bad_host, Err(SessionError::ConfigurationError(_))));
    }

    /// Request as seen by the stub server
    #[derive(Debug, Clone)]
    struct Captured {
        method: String,
        target: String,
        authorization: Option<String>,
        body: String,
    }

    /// Answers each connection with the next canned `(status, body)` and
    /// records the requests it saw
    async fn stub_server(responses: Vec<(u16, String)>) -> (StoreConfig, Arc<Mutex<Vec<Captured>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let captured = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&captured);

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                log.lock().push(request);

                let reply = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        let config = StoreConfig::new().with_host("127.0.0.1").with_port(port);
        (config, captured)
    }

    async fn read_request(socket: &mut TcpStream) -> Captured {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before request headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap().split(' ');
        let method = request_line.next().unwrap().to_string();
        let target = request_line.next().unwrap().to_string();

        let mut content_length = 0;
        let mut authorization = None;
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                } else if name.eq_ignore_ascii_case("authorization") {
                    authorization = Some(value.trim().to_string());
                }
            }
        }

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        Captured {
            method,
            target,
            authorization,
            body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_request_and_auth() {
        let body = json!({ "sid": "a", "session": "{}" }).to_string();
        let (config, captured) = stub_server(vec![(200, body)]).await;
        let client = MarkLogicClient::new(&config.with_database("Sessions")).unwrap();

        let doc = client.read("/sessions/a.json").await.unwrap();
        assert_eq!(doc["sid"], "a");

        let requests = captured.lock().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(
            requests[0].target,
            "/v1/documents?database=Sessions&uri=%2Fsessions%2Fa.json&format=json"
        );
        // admin:admin
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Basic YWRtaW46YWRtaW4=")
        );
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let (config, captured) =
            stub_server(vec![(404, String::new()), (404, String::new())]).await;
        let client = MarkLogicClient::new(&config).unwrap();

        assert!(client.read("/sessions/a.json").await.unwrap_err().is_not_found());
        assert!(client.remove("/sessions/a.json").await.unwrap_err().is_not_found());

        let requests = captured.lock().clone();
        assert_eq!(requests[1].method, "DELETE");
        assert_eq!(requests[1].target, "/v1/documents?uri=%2Fsessions%2Fa.json");
    }

    #[tokio::test]
    async fn test_write_tags_collections() {
        let (config, captured) = stub_server(vec![(201, String::new())]).await;
        let client = MarkLogicClient::new(&config).unwrap();
        let content = json!({ "sid": "a", "session": "{}", "expires": "2030-01-01T00:00:00Z" });

        client
            .write("/sessions/a.json", &["sessions".to_string()], &content)
            .await
            .unwrap();

        let requests = captured.lock().clone();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(
            requests[0].target,
            "/v1/documents?uri=%2Fsessions%2Fa.json&format=json&collection=sessions"
        );
        let sent: Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(sent, content);
    }

    #[tokio::test]
    async fn test_error_status_truncates_body() {
        let (config, _) = stub_server(vec![(500, "x".repeat(600))]).await;
        let client = MarkLogicClient::new(&config).unwrap();

        match client.remove("/sessions/a.json").await {
            Err(SessionError::StoreError(msg)) => {
                assert!(msg.contains("HTTP 500"));
                assert!(msg.contains(&"x".repeat(MAX_ERROR_BODY)));
                assert!(!msg.contains(&"x".repeat(MAX_ERROR_BODY + 1)));
            }
            other => panic!("expected store error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_count_reads_total() {
        let responses = vec![
            (200, json!({ "total": 7, "start": 1 }).to_string()),
            (200, json!({ "start": 1 }).to_string()),
        ];
        let (config, captured) = stub_server(responses).await;
        let client = MarkLogicClient::new(&config).unwrap();

        assert_eq!(client.count("sessions").await.unwrap(), 7);
        assert!(matches!(
            client.count("sessions").await,
            Err(SessionError::StoreError(_))
        ));

        let requests = captured.lock().clone();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(
            requests[0].target,
            "/v1/search?collection=sessions&pageLength=0&format=json"
        );
    }

    #[tokio::test]
    async fn test_collection_404_is_store_error() {
        let (config, captured) =
            stub_server(vec![(404, String::new()), (404, String::new())]).await;
        let client = MarkLogicClient::new(&config).unwrap();

        assert!(matches!(
            client.count("sessions").await,
            Err(SessionError::StoreError(_))
        ));
        assert!(matches!(
            client.remove_all("sessions").await,
            Err(SessionError::StoreError(_))
        ));

        let requests = captured.lock().clone();
        assert_eq!(requests[1].method, "DELETE");
        assert_eq!(requests[1].target, "/v1/search?collection=sessions");
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_request_warns_once() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tokio_test::block_on(async {
                let (config, _) = stub_server(vec![(500, "boom".to_string())]).await;
                let store = DocumentStore::new(config).unwrap();
                assert!(store.get("abc123").await.is_err());
            })
        });

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        assert_eq!(output.matches("WARN").count(), 1);
    }

    // Tests below require a running MarkLogic REST server on 127.0.0.1:8000
    // Run with: cargo test -- --ignored

    #[tokio::test]
    #[ignore]
    async fn test_marklogic_client_basic() {
        let client = MarkLogicClient::new(&StoreConfig::default()).unwrap();
        let collections = vec!["marklogic-client-test".to_string()];

        client.remove_all("marklogic-client-test").await.unwrap();

        let uri = "/marklogic-client-test/a.json";
        client
            .write(uri, &collections, &json!({ "sid": "a" }))
            .await
            .unwrap();
        assert_eq!(client.read(uri).await.unwrap()["sid"], "a");
        assert_eq!(client.count("marklogic-client-test").await.unwrap(), 1);

        client.remove(uri).await.unwrap();
        assert!(client.read(uri).await.unwrap_err().is_not_found());
    }
}
