//! Request and response payloads for the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::AuthUser;

/// Access/refresh token pair with server-issued expiry timestamps.
///
/// The access token is short-lived (~15 minutes), the refresh token
/// long-lived (~7 days). A refresh replaces only the access token; the
/// refresh token is never rotated. Backends that omit the expiry
/// timestamps fall back to the default TTLs when the pair is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub password: String,
    pub agreed_to_terms: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterData {
    pub user_id: String,
    pub email: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyData {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResendData {
    pub expires_in_seconds: u64,
}

/// Login either requires an MFA step (`mfa_required` with a user id and code
/// expiry) or, for backends that skip MFA, returns the profile and tokens
/// directly.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub mfa_required: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub mfa_expires_in_seconds: Option<u64>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub tokens: Option<TokenPair>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MfaData {
    pub user: AuthUser,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshData {
    pub access_token: String,
    #[serde(default)]
    pub access_token_expires_at: Option<DateTime<Utc>>,
}
