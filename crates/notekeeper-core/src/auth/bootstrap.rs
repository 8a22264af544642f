//! Session bootstrap: learn at startup whether a session already exists.
//!
//! One refresh call races a fallback timer. Whichever finishes first
//! finalizes the `SessionStore` and clears `loading`; the other becomes a
//! no-op. A timer win does not cancel the refresh call, it only discards its
//! result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api::{ApiError, AuthGateway};
use crate::models::TokenResponse;

use super::SessionStore;

/// How long startup waits for the refresh call before giving up.
pub const DEFAULT_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Authenticated { requires_profile_completion: bool },
    /// No session, or the refresh call failed.
    Anonymous,
    /// The fallback timer fired first.
    TimedOut,
}

/// Establish the initial session state. Never fails: every problem degrades
/// to "not logged in".
pub async fn bootstrap(
    gateway: &AuthGateway,
    session: &SessionStore,
    timeout: Duration,
) -> BootstrapOutcome {
    let finalized = Arc::new(AtomicBool::new(false));

    let mut refresh = {
        let gateway = gateway.clone();
        let session = session.clone();
        let finalized = Arc::clone(&finalized);
        tokio::spawn(async move {
            let result = gateway.refresh().await;
            if finalized.swap(true, Ordering::SeqCst) {
                debug!("Refresh finished after the fallback timer, ignoring");
                return None;
            }
            let outcome = apply_refresh(&gateway, &session, result);
            session.set_loading(false);
            Some(outcome)
        })
    };

    tokio::select! {
        joined = &mut refresh => finish(joined),
        _ = tokio::time::sleep(timeout) => {
            if finalized.swap(true, Ordering::SeqCst) {
                // The refresh claimed completion just as the timer fired
                finish(refresh.await)
            } else {
                warn!(timeout_ms = timeout.as_millis() as u64, "Auth check timeout fallback triggered");
                session.sign_out();
                session.set_loading(false);
                BootstrapOutcome::TimedOut
            }
        }
    }
}

fn finish(joined: Result<Option<BootstrapOutcome>, tokio::task::JoinError>) -> BootstrapOutcome {
    match joined {
        Ok(Some(outcome)) => outcome,
        Ok(None) => BootstrapOutcome::TimedOut,
        Err(e) => {
            error!(error = %e, "Bootstrap refresh task failed");
            BootstrapOutcome::Anonymous
        }
    }
}

fn apply_refresh(
    gateway: &AuthGateway,
    session: &SessionStore,
    result: Result<TokenResponse, ApiError>,
) -> BootstrapOutcome {
    let refreshed = match result {
        Ok(refreshed) => refreshed,
        Err(e) => {
            error!(error = %e, "Refresh error");
            session.sign_out();
            return BootstrapOutcome::Anonymous;
        }
    };

    let Some(token) = refreshed.token() else {
        debug!("No existing session");
        session.sign_out();
        return BootstrapOutcome::Anonymous;
    };

    if let Err(e) = gateway.credentials().set(token) {
        error!(error = %e, "Failed to store refreshed credential");
        session.sign_out();
        return BootstrapOutcome::Anonymous;
    }

    let requires_profile_completion = refreshed.requires_profile_completion;
    session.set_authenticated(true);
    session.set_requires_profile_completion(requires_profile_completion);
    info!(requires_profile_completion, "Session restored");
    BootstrapOutcome::Authenticated { requires_profile_completion }
}
