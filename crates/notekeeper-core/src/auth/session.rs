use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Client-side view of the session.
///
/// Never persisted: a fresh process starts `loading` and learns the rest
/// from the bootstrap refresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub loading: bool,
    pub requires_profile_completion: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            loading: true,
            requires_profile_completion: false,
        }
    }
}

/// Shared handle to the session state.
///
/// Clone is cheap; every clone sees and mutates the same state. Readers can
/// `subscribe` to be woken on changes.
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_state(SessionState::default())
    }

    pub fn with_state(state: SessionState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn set_authenticated(&self, value: bool) {
        self.update(|s| s.is_authenticated = value);
    }

    pub fn set_loading(&self, value: bool) {
        self.update(|s| s.loading = value);
    }

    pub fn set_requires_profile_completion(&self, value: bool) {
        self.update(|s| s.requires_profile_completion = value);
    }

    /// Not logged in and nothing pending on the profile.
    pub fn sign_out(&self) {
        self.update(|s| {
            s.is_authenticated = false;
            s.requires_profile_completion = false;
        });
    }

    fn update(&self, apply: impl FnOnce(&mut SessionState)) {
        self.state.send_if_modified(|state| {
            let before = *state;
            apply(state);
            let changed = before != *state;
            if changed {
                debug!(?before, after = ?*state, "Session state changed");
            }
            changed
        });
    }
}
