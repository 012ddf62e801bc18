//! MarkLogic session store example
//!
//! Writes, reads, counts and removes a session against a local MarkLogic REST
//! server. Documents use the same layout as the Node.js connect-marklogic
//! store, so sessions written here can be read by express-session and vice
//! versa.
//!
//! Environment:
//! - `MARKLOGIC_HOST` (default: 127.0.0.1)
//! - `MARKLOGIC_PORT` (default: 8000)
//! - `MARKLOGIC_USER` / `MARKLOGIC_PASSWORD` (default: admin / admin)
//!
//! Run with: `cargo run --example marklogic`

use std::env;
use std::sync::Arc;
use std::time::Duration;

use marklogic_session_store::{
    DocumentStore, HashConfig, MarkLogicClient, SessionData, SessionError, SessionStore,
    StoreConfig,
};

#[tokio::main]
async fn main() -> Result<(), SessionError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut config = StoreConfig::new()
        .with_collection("demo sessions")
        .with_timeout(Duration::from_secs(10));
    if let Ok(host) = env::var("MARKLOGIC_HOST") {
        config = config.with_host(host);
    }
    if let Some(port) = env::var("MARKLOGIC_PORT").ok().and_then(|p| p.parse().ok()) {
        config = config.with_port(port);
    }
    if let Ok(user) = env::var("MARKLOGIC_USER") {
        config = config.with_user(user);
    }
    if let Ok(password) = env::var("MARKLOGIC_PASSWORD") {
        config = config.with_password(password);
    }

    // One client, two stores: plain IDs and hashed IDs in separate collections
    let client = Arc::new(MarkLogicClient::new(&config)?);
    let store = DocumentStore::with_client(Arc::clone(&client), config.clone())?;
    let hashed = DocumentStore::with_client(
        client,
        config
            .with_collection("demo hashed sessions")
            .with_hash(HashConfig::new().with_algorithm("sha256")),
    )?;

    let mut session = SessionData::new(3600);
    session.set("user", "alice");
    session.set("views", 1);

    for store in [&store, &hashed] {
        store.set("abc123", &session).await?;
        let loaded = store.get("abc123").await?;
        println!(
            "{} -> {:?}",
            store.document_uri("abc123")?,
            loaded.and_then(|s| s.get::<String>("user"))
        );
        println!("sessions in {}: {}", store.collection(), store.length().await?);

        store.destroy("abc123").await?;
        println!("after destroy: {:?}", store.get("abc123").await?);
    }

    store.clear().await?;
    hashed.clear().await?;
    Ok(())
}
