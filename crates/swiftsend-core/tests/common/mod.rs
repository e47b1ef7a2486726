//! Shared helpers for integration tests: in-process servers and sessions
//! backed by a temporary token store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::{Duration, Utc};
use swiftsend_core::models::TokenPair;
use swiftsend_core::{ApiClient, Session, TokenStore};

/// Serve a router on an ephemeral port, returning its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{}", addr)
}

/// A fresh session over a temporary token store. Keep the TempDir alive for
/// the duration of the test.
pub fn session() -> (tempfile::TempDir, Arc<Session>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TokenStore::new(dir.path().to_path_buf());
    let session = Arc::new(Session::new(store).expect("session"));
    (dir, session)
}

pub fn client(base_url: &str, session: Arc<Session>) -> ApiClient {
    ApiClient::new(base_url, session).expect("client")
}

pub fn token_pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        access_token_expires_at: Some(Utc::now() + Duration::minutes(15)),
        refresh_token_expires_at: Some(Utc::now() + Duration::days(7)),
    }
}
