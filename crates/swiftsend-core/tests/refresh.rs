//! Refresh-protocol properties, exercised against purpose-built routers
//! that count refresh calls and control which bearer tokens they accept.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use swiftsend_core::ApiError;

const FRESH_TOKEN: &str = "fresh_token";
const PROFILE_PATH: &str = "/api/v1/profile";

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "error": "Token expired",
            "error_code": "UNAUTHORIZED",
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

fn ok_profile() -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": { "ok": true } })),
    )
        .into_response()
}

fn refresh_success() -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "access_token": FRESH_TOKEN,
                "access_token_expires_at":
                    (Utc::now() + chrono::Duration::minutes(15)).to_rfc3339(),
            },
        })),
    )
        .into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// N concurrent 401s issue exactly one refresh; every caller completes from
/// its outcome, and only the access token changes.
#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let refresh_calls = Arc::new(AtomicUsize::new(0));
    let counter = refresh_calls.clone();

    let app = Router::new()
        .route(
            PROFILE_PATH,
            get(|headers: HeaderMap| async move {
                if bearer(&headers) == Some(FRESH_TOKEN) {
                    ok_profile()
                } else {
                    unauthorized()
                }
            }),
        )
        .route(
            "/api/v1/auth/refresh",
            post(move || {
                let counter = counter.clone();
                async move {
                    // Hold the refresh open long enough for every caller to
                    // hit its 401 and join the in-flight handle.
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    refresh_success()
                }
            }),
        );

    let base_url = common::serve(app).await;
    let (_dir, session) = common::session();
    session
        .set_tokens(&common::token_pair("stale", "mock_refresh_seed"))
        .expect("seed tokens");
    let client = common::client(&base_url, session.clone());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .request::<Value, ()>(Method::GET, PROFILE_PATH, None)
                .await
        }));
    }
    for handle in handles {
        let result = handle.await.expect("join");
        assert!(result.is_ok(), "request failed: {:?}", result.err());
    }

    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    // Refresh token unchanged, access token rotated.
    assert_eq!(session.access_token().as_deref(), Some(FRESH_TOKEN));
    assert_eq!(session.refresh_token().as_deref(), Some("mock_refresh_seed"));
}

/// A 401 that survives the refresh-retry surfaces as an error; no second
/// refresh cycle is started.
#[tokio::test]
async fn second_unauthorized_surfaces_without_another_refresh() {
    let refresh_calls = Arc::new(AtomicUsize::new(0));
    let counter = refresh_calls.clone();

    let app = Router::new()
        .route(PROFILE_PATH, get(|| async { unauthorized() }))
        .route(
            "/api/v1/auth/refresh",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    refresh_success()
                }
            }),
        );

    let base_url = common::serve(app).await;
    let (_dir, session) = common::session();
    session
        .set_tokens(&common::token_pair("stale", "mock_refresh_seed"))
        .expect("seed tokens");
    let client = common::client(&base_url, session.clone());

    let err = client
        .request::<Value, ()>(Method::GET, PROFILE_PATH, None)
        .await
        .expect_err("retry should fail");

    match err {
        ApiError::Api { status, code, .. } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(code, "UNAUTHORIZED");
        }
        other => panic!("expected structured API error, got {:?}", other),
    }
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    // The session survives: the refresh itself succeeded.
    assert_eq!(session.access_token().as_deref(), Some(FRESH_TOKEN));
}

/// A rejected refresh tears the whole session down and reports
/// `SessionExpired`; the caller owns the navigation decision.
#[tokio::test]
async fn rejected_refresh_clears_session() {
    let app = Router::new()
        .route(PROFILE_PATH, get(|| async { unauthorized() }))
        .route(
            "/api/v1/auth/refresh",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "success": false,
                        "error": "Invalid or expired refresh token",
                        "error_code": "INVALID_REFRESH_TOKEN",
                        "timestamp": Utc::now().to_rfc3339(),
                    })),
                )
            }),
        );

    let base_url = common::serve(app).await;
    let (dir, session) = common::session();
    session
        .set_tokens(&common::token_pair("stale", "mock_refresh_seed"))
        .expect("seed tokens");
    let client = common::client(&base_url, session.clone());

    let err = client
        .request::<Value, ()>(Method::GET, PROFILE_PATH, None)
        .await
        .expect_err("refresh should fail");
    assert!(matches!(err, ApiError::SessionExpired));

    assert!(session.access_token().is_none());
    assert!(session.refresh_token().is_none());
    assert!(session.user().is_none());

    // Nothing survives on disk either.
    let store = swiftsend_core::TokenStore::new(dir.path().to_path_buf());
    let (access, refresh) = store.load().expect("load");
    assert!(access.is_none());
    assert!(refresh.is_none());
}

/// Extra headers given to `request_with_headers` reach the service, and
/// they ride along on the refresh-retry of the original call.
#[tokio::test]
async fn extra_headers_survive_the_refresh_retry() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let capture = seen.clone();

    let app = Router::new()
        .route(
            PROFILE_PATH,
            get(move |headers: HeaderMap| {
                let capture = capture.clone();
                async move {
                    if let Some(key) =
                        headers.get("idempotency-key").and_then(|v| v.to_str().ok())
                    {
                        capture.lock().expect("lock").push(key.to_string());
                    }
                    if bearer(&headers) == Some(FRESH_TOKEN) {
                        ok_profile()
                    } else {
                        unauthorized()
                    }
                }
            }),
        )
        .route("/api/v1/auth/refresh", post(|| async { refresh_success() }));

    let base_url = common::serve(app).await;
    let (_dir, session) = common::session();
    session
        .set_tokens(&common::token_pair("stale", "mock_refresh_seed"))
        .expect("seed tokens");
    let client = common::client(&base_url, session);

    let mut headers = HeaderMap::new();
    headers.insert("idempotency-key", "idem_42".parse().expect("header value"));
    client
        .request_with_headers::<Value, ()>(Method::GET, PROFILE_PATH, None, headers)
        .await
        .expect("request");

    // Both the original attempt and the post-refresh retry carried the key.
    let keys = seen.lock().expect("lock");
    assert_eq!(keys.as_slice(), ["idem_42", "idem_42"]);
}

/// Every call carries a fresh, unique X-Request-ID.
#[tokio::test]
async fn requests_carry_unique_correlation_ids() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let capture = seen.clone();

    let app = Router::new().route(
        PROFILE_PATH,
        get(move |headers: HeaderMap| {
            let capture = capture.clone();
            async move {
                if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
                    capture.lock().expect("lock").push(id.to_string());
                }
                ok_profile()
            }
        }),
    );

    let base_url = common::serve(app).await;
    let (_dir, session) = common::session();
    let client = common::client(&base_url, session);

    for _ in 0..2 {
        client
            .request::<Value, ()>(Method::GET, PROFILE_PATH, None)
            .await
            .expect("request");
    }

    let ids = seen.lock().expect("lock");
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    for id in ids.iter() {
        uuid::Uuid::parse_str(id).expect("correlation id is a UUID");
    }
}
