//! REST API client module for the notekeeper backend.
//!
//! `AuthGateway` is the single HTTP path: it attaches the bearer credential
//! and recovers from an expired credential with one silent refresh and retry.
//! `ApiClient` layers typed endpoint methods on top of it.

pub mod client;
pub mod error;
pub mod gateway;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::AuthGateway;
pub use request::{ApiRequest, Attempt, REFRESH_PATH};
