//! Authenticated HTTP client for the swiftsend auth service.
//!
//! Wraps `reqwest` with bearer-token attachment, a per-request correlation
//! ID, and the refresh-and-retry protocol: a 401 triggers a single-flight
//! refresh of the access token and exactly one retry of the original call.
//! When the refresh itself fails, the session is torn down and
//! `ApiError::SessionExpired` is returned; navigation is the caller's
//! decision, never this layer's.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ApiError;
use crate::auth::Session;
use crate::models::{
    Envelope, LoginData, MfaData, PendingVerification, RefreshData, RegisterData,
    RegisterRequest, ResendData, VerifyData,
};

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Correlation header attached to every request, retries included
const REQUEST_ID_HEADER: &str = "X-Request-ID";

const REGISTER_PATH: &str = "/api/v1/auth/register";
const VERIFY_PATH: &str = "/api/v1/auth/verify";
const RESEND_PATH: &str = "/api/v1/auth/resend-verification";
const LOGIN_PATH: &str = "/api/v1/auth/login";
const VERIFY_MFA_PATH: &str = "/api/v1/auth/verify-mfa";
const REFRESH_PATH: &str = "/api/v1/auth/refresh";
const LOGOUT_PATH: &str = "/api/v1/auth/logout";

/// Why a refresh attempt failed. Cloneable because every waiter on the
/// shared refresh future receives its own copy of the outcome.
#[derive(Debug, Clone)]
enum RefreshError {
    /// The service rejected the refresh token
    Rejected { code: String },
    /// The refresh request never completed
    Network(String),
    /// The refresh response violated the wire contract
    Invalid(String),
    /// No refresh token was held when the refresh started
    Missing,
}

type RefreshOutcome = Result<String, RefreshError>;
type RefreshHandle = Shared<BoxFuture<'static, RefreshOutcome>>;

/// API client for the swiftsend auth service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and clones share the session and the single-flight slot.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
    /// Single-flight slot: holds the shared handle while a refresh is in
    /// flight so concurrent 401s join it instead of issuing their own.
    refresh_in_flight: Arc<Mutex<Option<RefreshHandle>>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            refresh_in_flight: Arc::new(Mutex::new(None)),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send an authenticated request and parse the `data` field of the
    /// success envelope. A 401 is resolved through the single-flight
    /// refresh protocol with exactly one retry.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_with_headers(method, path, body, HeaderMap::new())
            .await
    }

    /// Like [`ApiClient::request`], with extra headers attached to the call.
    /// The headers ride along on the retry as well.
    pub async fn request_with_headers<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (status, body) = self.execute(method, path, body, &headers).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Status {}: {}", status, e))
        })?;
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse("Response envelope has no data".into()))
    }

    // ===== Auth operations =====

    /// Register a new account. On success the pending-verification record is
    /// recorded so the OTP step can find the challenge target.
    pub async fn register(&self, req: &RegisterRequest) -> Result<RegisterData, ApiError> {
        let data: RegisterData = self.request(Method::POST, REGISTER_PATH, Some(req)).await?;
        self.session.set_pending_verification(PendingVerification {
            user_id: data.user_id.clone(),
            email: data.email.clone(),
            phone: req.phone.clone(),
        });
        Ok(data)
    }

    /// Confirm the email/phone OTP. Clears the pending-verification record
    /// once the account is active.
    pub async fn verify(&self, user_id: &str, code: &str) -> Result<VerifyData, ApiError> {
        let body = json!({ "user_id": user_id, "code": code });
        let data: VerifyData = self.request(Method::POST, VERIFY_PATH, Some(&body)).await?;
        self.session.clear_pending_verification();
        Ok(data)
    }

    pub async fn resend_verification(&self, user_id: &str) -> Result<ResendData, ApiError> {
        let body = json!({ "user_id": user_id });
        self.request(Method::POST, RESEND_PATH, Some(&body)).await
    }

    /// Sign in with email and password. When the backend gates the login
    /// behind MFA, the pending-verification record is set for the code step;
    /// when it returns tokens directly, they are installed.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ApiError> {
        let body = json!({ "email": email, "password": password });
        let data: LoginData = self.request(Method::POST, LOGIN_PATH, Some(&body)).await?;

        if let Some(tokens) = &data.tokens {
            self.session
                .set_tokens(tokens)
                .map_err(|e| ApiError::Storage(e.to_string()))?;
            if let Some(user) = &data.user {
                self.session.set_user(user.clone());
            }
        } else if data.mfa_required {
            if let Some(user_id) = &data.user_id {
                self.session.set_pending_verification(PendingVerification {
                    user_id: user_id.clone(),
                    email: email.to_string(),
                    phone: String::new(),
                });
            }
        }
        Ok(data)
    }

    /// Confirm the MFA code. Installs the token pair and user profile and
    /// clears the pending-verification record.
    pub async fn verify_mfa(&self, user_id: &str, code: &str) -> Result<MfaData, ApiError> {
        let body = json!({ "user_id": user_id, "code": code });
        let data: MfaData = self
            .request(Method::POST, VERIFY_MFA_PATH, Some(&body))
            .await?;

        self.session
            .set_tokens(&data.tokens)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        self.session.set_user(data.user.clone());
        self.session.clear_pending_verification();
        Ok(data)
    }

    /// Sign out. The service call is best effort; the local session is
    /// cleared regardless of its outcome.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Err(err) = self
            .execute(Method::POST, LOGOUT_PATH, None::<&()>, &HeaderMap::new())
            .await
        {
            warn!(error = %err, "Logout request failed; clearing session anyway");
        }
        self.session
            .clear()
            .map_err(|e| ApiError::Storage(e.to_string()))
    }

    // ===== Request machinery =====

    /// Send the call, resolving a 401 through the single-flight refresh
    /// protocol when a refresh token is held, with exactly one retry.
    /// Returns the status and body of the final response; non-success
    /// statuses become structured errors.
    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: &HeaderMap,
    ) -> Result<(StatusCode, String), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let token = self.session.access_token();
        let mut response = self
            .send(method.clone(), path, body, headers, token.as_deref())
            .await?;

        // A 401 without a refresh token is a domain error (e.g. bad
        // credentials at login), not an expired session.
        if response.status() == StatusCode::UNAUTHORIZED && self.session.refresh_token().is_some()
        {
            debug!(path, "Unauthorized; attempting token refresh");
            let new_token = self.refresh_access_token().await?;
            response = self
                .send(method, path, body, headers, Some(&new_token))
                .await?;
        }

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }
        Ok((status, body))
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: &HeaderMap,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method, &url)
            .headers(headers.clone())
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Resolve a 401 by refreshing the access token. Concurrent callers all
    /// await the same in-flight refresh and observe its one outcome.
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let handle = {
            let mut slot = self.refresh_slot();
            match slot.as_ref() {
                Some(handle) => handle.clone(),
                None => {
                    let handle = self.start_refresh();
                    *slot = Some(handle.clone());
                    handle
                }
            }
        };

        match handle.await {
            Ok(token) => Ok(token),
            Err(err) => {
                debug!(?err, "Refresh failed; session has been cleared");
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Build the shared refresh future. The single-flight slot is released
    /// inside the future itself, so it clears on every exit path and late
    /// joiners still receive the published outcome.
    fn start_refresh(&self) -> RefreshHandle {
        let client = self.clone();
        async move {
            let outcome = client.do_refresh().await;
            client.refresh_slot().take();
            outcome
        }
        .boxed()
        .shared()
    }

    /// Perform the actual refresh call. Any failure tears the session down:
    /// a client that cannot refresh holds nothing worth keeping.
    async fn do_refresh(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.session.refresh_token() else {
            self.clear_session();
            return Err(RefreshError::Missing);
        };

        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let result = self
            .http
            .post(&url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.clear_session();
                return Err(RefreshError::Network(err.to_string()));
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            self.clear_session();
            let code = match ApiError::from_response(status, &body) {
                ApiError::Api { code, .. } => code,
                _ => "UNKNOWN_ERROR".to_string(),
            };
            warn!(%status, code = %code, "Refresh rejected by the auth service");
            return Err(RefreshError::Rejected { code });
        }

        let envelope: Envelope<RefreshData> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.clear_session();
                return Err(RefreshError::Invalid(err.to_string()));
            }
        };
        let Some(data) = envelope.data else {
            self.clear_session();
            return Err(RefreshError::Invalid(
                "Refresh response has no data".to_string(),
            ));
        };

        if let Err(err) = self
            .session
            .set_access_token(&data.access_token, data.access_token_expires_at)
        {
            self.clear_session();
            return Err(RefreshError::Invalid(err.to_string()));
        }

        debug!("Access token refreshed");
        Ok(data.access_token)
    }

    fn clear_session(&self) {
        if let Err(err) = self.session.clear() {
            warn!(error = %err, "Failed to clear persisted tokens");
        }
    }

    fn refresh_slot(&self) -> std::sync::MutexGuard<'_, Option<RefreshHandle>> {
        self.refresh_in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}
