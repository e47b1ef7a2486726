//! API layer: the authenticated client and its error taxonomy.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

// Re-exported so consumers don't need a direct reqwest dependency for the
// generic request surface.
pub use reqwest::{Method, StatusCode};
