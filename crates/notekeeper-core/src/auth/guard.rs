//! Route guards: permit or redirect navigation based on `SessionState`.

use super::route::Route;
use super::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Open to everyone.
    Public,
    /// Requires a signed-in session.
    Authenticated,
    /// Signed in with the profile still to be completed.
    ProfileCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still bootstrapping; show a waiting indicator, decide nothing yet.
    Wait,
    Allow,
    Redirect(Route),
}

impl Guard {
    pub fn check(&self, state: &SessionState) -> GuardDecision {
        if *self == Guard::Public {
            return GuardDecision::Allow;
        }
        if state.loading {
            return GuardDecision::Wait;
        }
        if !state.is_authenticated {
            return GuardDecision::Redirect(Route::Login);
        }
        match self {
            Guard::ProfileCompletion if !state.requires_profile_completion => {
                GuardDecision::Redirect(Route::Dashboard)
            }
            _ => GuardDecision::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(loading: bool, authed: bool, incomplete: bool) -> SessionState {
        SessionState {
            is_authenticated: authed,
            loading,
            requires_profile_completion: incomplete,
        }
    }

    #[test]
    fn test_loading_never_redirects() {
        for guard in [Guard::Authenticated, Guard::ProfileCompletion] {
            assert_eq!(guard.check(&state(true, false, false)), GuardDecision::Wait);
            assert_eq!(guard.check(&state(true, true, true)), GuardDecision::Wait);
        }
    }

    #[test]
    fn test_authenticated_guard() {
        let guard = Guard::Authenticated;
        assert_eq!(
            guard.check(&state(false, false, false)),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(guard.check(&state(false, true, false)), GuardDecision::Allow);
        assert_eq!(guard.check(&state(false, true, true)), GuardDecision::Allow);
    }

    #[test]
    fn test_profile_completion_guard() {
        let guard = Guard::ProfileCompletion;
        assert_eq!(
            guard.check(&state(false, false, true)),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(
            guard.check(&state(false, true, false)),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(guard.check(&state(false, true, true)), GuardDecision::Allow);
    }

    #[test]
    fn test_public_always_allows() {
        assert_eq!(Guard::Public.check(&state(true, false, false)), GuardDecision::Allow);
        assert_eq!(Guard::Public.check(&state(false, false, false)), GuardDecision::Allow);
    }
}
