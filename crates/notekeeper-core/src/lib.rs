//! Core library for notekeeper.
//!
//! This crate holds everything a notekeeper front end needs besides rendering:
//!
//! - `api`: the `AuthGateway` (bearer attachment and silent refresh-and-retry)
//!   and the typed `ApiClient` for the auth and notes endpoints
//! - `auth`: credential storage, the `SessionStore`, session bootstrap,
//!   route guards and the login/registration/recovery flows
//! - `notes`: the personal notes list and its CRUD operations
//! - `models`: wire types shared with the backend
//! - `config`: persisted application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notes;

pub use api::{ApiClient, ApiError, ApiRequest, Attempt, AuthGateway};
pub use auth::{
    bootstrap, AuthError, AuthFlows, BootstrapOutcome, CredentialError, CredentialStore,
    FileCredentialStore, Guard, GuardDecision, KeyringCredentialStore, MemoryCredentialStore,
    Navigator, RecordingNavigator, Route, SessionState, SessionStore,
};
pub use config::{Config, CredentialBackend};
pub use models::{Note, TokenResponse, UserProfile};
pub use notes::{NotesError, NotesStore};

#[cfg(test)]
pub(crate) mod testing;
