//! Mock swiftsend auth service.
//!
//! Implements the development contract for the auth endpoints: one fixed
//! OTP, one accepted password, and sentinel email addresses that trigger
//! each error path. Every error uses the envelope
//! `{ success: false, error, error_code, timestamp }`.
//!
//! The router is served standalone by the `swiftsend-mock` binary and
//! mounted in-process by the integration tests of `swiftsend-core`.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

/// The only OTP the mock accepts, for account and MFA verification alike
pub const MOCK_OTP: &str = "123456";

/// The only password the mock accepts at login
pub const MOCK_PASSWORD: &str = "Password123!";

/// Registering with this address simulates a duplicate account
pub const DUPLICATE_EMAIL: &str = "existing@example.com";

/// Logging in with this address simulates a rate-limited account
pub const BLOCKED_EMAIL: &str = "blocked@example.com";

/// Logging in with this address simulates an unverified account
pub const UNVERIFIED_EMAIL: &str = "unverified@example.com";

/// Issued tokens carry these markers; refresh only accepts marked tokens
pub const ACCESS_TOKEN_PREFIX: &str = "mock_access_";
pub const REFRESH_TOKEN_PREFIX: &str = "mock_refresh_";

const MOCK_USER_ID: &str = "usr_mock123";
const OTP_EXPIRES_IN_SECONDS: u64 = 300;
const ACCESS_TOKEN_TTL_SECONDS: i64 = 900;
const REFRESH_TOKEN_TTL_SECONDS: i64 = 604_800;

#[derive(Debug, Clone)]
struct PendingUser {
    user_id: String,
    email: String,
    phone: String,
}

/// Server-side state for the mock session: at most one pending registration.
#[derive(Clone, Default)]
pub struct MockState {
    pending: Arc<Mutex<Option<PendingUser>>>,
}

/// Build the mock auth router, mounted at `/api/v1/auth`.
pub fn router() -> Router {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/verify", post(verify))
        .route(
            "/api/v1/auth/resend-verification",
            post(resend_verification),
        )
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/verify-mfa", post(verify_mfa))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/auth/logout", post(logout))
        .with_state(MockState::default())
}

fn error_response(message: &str, code: &str, status: StatusCode) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": message,
            "error_code": code,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

fn success_response(status: StatusCode, message: &str, data: Value) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

fn issue_token(prefix: &str, issued_at: DateTime<Utc>) -> String {
    format!("{}{}", prefix, issued_at.timestamp())
}

fn is_valid_refresh_token(token: &str) -> bool {
    token.starts_with(REFRESH_TOKEN_PREFIX)
}

// ===== Handlers =====

#[derive(Debug, Deserialize)]
struct RegisterBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    password: String,
}

async fn register(State(state): State<MockState>, Json(body): Json<RegisterBody>) -> Response {
    if body.email.is_empty() || body.password.is_empty() || body.phone.is_empty() {
        return error_response("Missing required fields", "MISSING_FIELDS", StatusCode::BAD_REQUEST);
    }
    if body.email == DUPLICATE_EMAIL {
        return error_response("Email already in use", "EMAIL_ALREADY_EXISTS", StatusCode::CONFLICT);
    }

    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    let user_id = format!("usr_{}", suffix);

    *lock(&state.pending) = Some(PendingUser {
        user_id: user_id.clone(),
        email: body.email.clone(),
        phone: body.phone.clone(),
    });
    debug!(user_id = %user_id, "Registered pending user");

    success_response(
        StatusCode::CREATED,
        "Registration successful. Please verify your email and phone.",
        json!({
            "user_id": user_id,
            "email": body.email,
            "status": "PENDING_VERIFICATION",
        }),
    )
}

#[derive(Debug, Deserialize)]
struct CodeBody {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    code: String,
}

async fn verify(Json(body): Json<CodeBody>) -> Response {
    if body.code != MOCK_OTP {
        return error_response(
            "Invalid or expired verification code",
            "INVALID_OTP",
            StatusCode::BAD_REQUEST,
        );
    }
    success_response(
        StatusCode::OK,
        "Verification successful. Your account is now active.",
        json!({ "status": "ACTIVE" }),
    )
}

async fn resend_verification(
    State(state): State<MockState>,
    Json(body): Json<CodeBody>,
) -> Response {
    if body.user_id.is_none() && lock(&state.pending).is_none() {
        return error_response(
            "No pending verification found",
            "NO_PENDING_VERIFICATION",
            StatusCode::BAD_REQUEST,
        );
    }
    success_response(
        StatusCode::OK,
        "A new verification code has been sent.",
        json!({ "expires_in_seconds": OTP_EXPIRES_IN_SECONDS }),
    )
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    if body.email == BLOCKED_EMAIL {
        return error_response(
            "Too many login attempts. Please try again in 15 minutes.",
            "RATE_LIMIT_EXCEEDED",
            StatusCode::TOO_MANY_REQUESTS,
        );
    }
    if body.password != MOCK_PASSWORD {
        return error_response(
            "Invalid email or password",
            "INVALID_CREDENTIALS",
            StatusCode::UNAUTHORIZED,
        );
    }
    if body.email == UNVERIFIED_EMAIL {
        return error_response(
            "Account not verified. Please check your email.",
            "ACCOUNT_NOT_VERIFIED",
            StatusCode::FORBIDDEN,
        );
    }

    // Every valid login is MFA-gated in the mock.
    success_response(
        StatusCode::OK,
        "Credentials verified. MFA code sent to your registered phone.",
        json!({
            "mfa_required": true,
            "user_id": MOCK_USER_ID,
            "mfa_expires_in_seconds": OTP_EXPIRES_IN_SECONDS,
        }),
    )
}

async fn verify_mfa(Json(body): Json<CodeBody>) -> Response {
    if body.code != MOCK_OTP {
        return error_response(
            "Invalid or expired MFA code",
            "INVALID_MFA_CODE",
            StatusCode::BAD_REQUEST,
        );
    }

    let now = Utc::now();
    success_response(
        StatusCode::OK,
        "MFA verified. Login successful.",
        json!({
            "user": {
                "user_id": MOCK_USER_ID,
                "email": "user@example.com",
                "first_name": "John",
                "last_name": "Doe",
                "kyc_status": "PENDING",
            },
            "tokens": {
                "access_token": issue_token(ACCESS_TOKEN_PREFIX, now),
                "refresh_token": issue_token(REFRESH_TOKEN_PREFIX, now),
                "access_token_expires_at":
                    (now + Duration::seconds(ACCESS_TOKEN_TTL_SECONDS)).to_rfc3339(),
                "refresh_token_expires_at":
                    (now + Duration::seconds(REFRESH_TOKEN_TTL_SECONDS)).to_rfc3339(),
            },
        }),
    )
}

#[derive(Debug, Deserialize)]
struct RefreshBody {
    #[serde(default)]
    refresh_token: Option<String>,
}

async fn refresh(Json(body): Json<RefreshBody>) -> Response {
    let Some(refresh_token) = body.refresh_token.filter(|t| !t.is_empty()) else {
        return error_response(
            "Refresh token is required",
            "MISSING_TOKEN",
            StatusCode::BAD_REQUEST,
        );
    };
    if !is_valid_refresh_token(&refresh_token) {
        return error_response(
            "Invalid or expired refresh token",
            "INVALID_REFRESH_TOKEN",
            StatusCode::UNAUTHORIZED,
        );
    }

    // Only the access token rotates; the refresh token is never reissued.
    let now = Utc::now();
    success_response(
        StatusCode::OK,
        "Token refreshed.",
        json!({
            "access_token": issue_token(ACCESS_TOKEN_PREFIX, now),
            "access_token_expires_at":
                (now + Duration::seconds(ACCESS_TOKEN_TTL_SECONDS)).to_rfc3339(),
        }),
    )
}

async fn logout(State(state): State<MockState>) -> Response {
    lock(&state.pending).take();
    success_response(StatusCode::OK, "Logged out successfully.", json!({}))
}

fn lock(pending: &Mutex<Option<PendingUser>>) -> std::sync::MutexGuard<'_, Option<PendingUser>> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}
