//! swiftsend-core - client SDK for the swiftsend money-transfer auth surface.
//!
//! The centerpiece is the session/token lifecycle: [`auth::Session`] owns the
//! access/refresh token pair and [`api::ApiClient`] performs authenticated
//! requests with a single-flight refresh-and-retry protocol on authorization
//! failures. Around it sit the persistent token store, the route guard, and
//! the client-side field validation rules.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod routes;
pub mod validate;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, TokenStore};
pub use config::Config;
