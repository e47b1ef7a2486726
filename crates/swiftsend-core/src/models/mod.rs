//! Data models shared across the API client, session, and validation layers.

pub mod auth;
pub mod envelope;
pub mod user;

pub use auth::{
    LoginData, MfaData, RefreshData, RegisterData, RegisterRequest, ResendData, TokenPair,
    VerifyData,
};
pub use envelope::{Envelope, ErrorEnvelope};
pub use user::{AuthUser, PendingVerification};
