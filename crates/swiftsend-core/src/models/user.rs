use serde::{Deserialize, Serialize};

/// Authenticated user profile, returned on MFA verification.
/// Held in memory only; it is not persisted across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub kyc_status: String,
}

/// Transient record linking an identity to an outstanding one-time-code
/// challenge. Exists between registration (or MFA-gated login) and OTP
/// confirmation. The phone field is empty for the login path, where the
/// delivery target is already registered server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingVerification {
    pub user_id: String,
    pub email: String,
    pub phone: String,
}
