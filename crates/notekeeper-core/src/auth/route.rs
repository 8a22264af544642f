use std::fmt;
use std::sync::Mutex;

use tracing::info;

use super::guard::Guard;

/// Application entry points a front end can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Signup,
    Login,
    ForgotPassword,
    ResetPassword,
    CompleteProfile,
    Dashboard,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Signup,
        Route::Login,
        Route::ForgotPassword,
        Route::ResetPassword,
        Route::CompleteProfile,
        Route::Dashboard,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Signup => "/signup",
            Route::Login => "/login",
            Route::ForgotPassword => "/forgot-password",
            Route::ResetPassword => "/reset-password",
            Route::CompleteProfile => "/complete-profile",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    /// The gate in front of this route.
    pub fn guard(&self) -> Guard {
        match self {
            Route::Dashboard => Guard::Authenticated,
            Route::CompleteProfile => Guard::ProfileCompletion,
            _ => Guard::Public,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs navigation on behalf of non-UI code, e.g. the forced redirect
/// to login after an unrecoverable refresh failure.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Queues navigations for the front end to act on at its next turn.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the navigations recorded so far.
    pub fn take(&self) -> Vec<Route> {
        match self.routes.lock() {
            Ok(mut routes) => std::mem::take(&mut *routes),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn count(&self, route: Route) -> usize {
        match self.routes.lock() {
            Ok(routes) => routes.iter().filter(|r| **r == route).count(),
            Err(poisoned) => poisoned.into_inner().iter().filter(|r| **r == route).count(),
        }
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "Navigation requested");
        match self.routes.lock() {
            Ok(mut routes) => routes.push(route),
            Err(poisoned) => poisoned.into_inner().push(route),
        }
    }
}
