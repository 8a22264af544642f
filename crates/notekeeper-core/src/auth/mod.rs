//! Authentication module for managing the client-side session.
//!
//! This module provides:
//! - `CredentialStore`: where the bearer credential lives (memory, file, OS keychain)
//! - `SessionStore`: shared `SessionState` with setters and change notification
//! - `bootstrap`: startup refresh raced against a fallback timer
//! - `Guard` / `Route`: navigation gates driven by the session state
//! - `AuthFlows`: login, registration, recovery and profile operations

pub mod bootstrap;
pub mod credentials;
pub mod flows;
pub mod guard;
pub mod route;
pub mod session;
pub mod validate;

pub use bootstrap::{bootstrap, BootstrapOutcome, DEFAULT_BOOTSTRAP_TIMEOUT};
pub use credentials::{
    CredentialError, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore, CREDENTIAL_KEY,
};
pub use flows::{AuthError, AuthFlows};
pub use guard::{Guard, GuardDecision};
pub use route::{Navigator, RecordingNavigator, Route};
pub use session::{SessionState, SessionStore};
pub use validate::{OtpCooldown, OTP_RESEND_COOLDOWN};
