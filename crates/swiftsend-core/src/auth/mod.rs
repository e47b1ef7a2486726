//! Session and token lifecycle management.
//!
//! This module provides:
//! - `Session`: the owned session object holding the token pair, user
//!   profile, and pending-verification record
//! - `TokenStore`: persistent token storage with per-entry expiry
//!
//! Tokens are persisted across restarts; the profile and pending record
//! are in-memory only.

pub mod session;
pub mod tokens;

pub use session::Session;
pub use tokens::{StoredToken, TokenStore};
