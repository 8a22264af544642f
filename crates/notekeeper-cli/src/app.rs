//! Application state for the notekeeper shell.
//!
//! Wires the core pieces together once at startup: one credential store, one
//! gateway, one session store, and the flows and notes list built on them.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use notekeeper_core::auth::OtpCooldown;
use notekeeper_core::{
    bootstrap, ApiClient, AuthFlows, AuthGateway, BootstrapOutcome, Config, GuardDecision,
    NotesStore, RecordingNavigator, Route, SessionStore,
};

pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub flows: AuthFlows,
    pub notes: NotesStore,
    pub otp_cooldown: OtpCooldown,
    gateway: AuthGateway,
    navigator: Arc<RecordingNavigator>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let credentials = config.credential_store()?;
        let navigator = Arc::new(RecordingNavigator::new());
        let gateway = AuthGateway::new(
            &config.api_base_url,
            config.request_timeout(),
            credentials,
            navigator.clone(),
        )?;
        let api = ApiClient::new(gateway.clone());
        let session = SessionStore::new();

        Ok(Self {
            flows: AuthFlows::new(api.clone(), session.clone()),
            notes: NotesStore::new(api),
            otp_cooldown: OtpCooldown::new(),
            config,
            session,
            gateway,
            navigator,
        })
    }

    /// Restore any existing session.
    pub async fn start(&mut self) -> BootstrapOutcome {
        bootstrap(&self.gateway, &self.session, self.config.bootstrap_timeout()).await
    }

    /// What the guard in front of `route` says right now.
    pub fn guard(&self, route: Route) -> GuardDecision {
        route.guard().check(&self.session.state())
    }

    /// Navigations the core asked for since the last call.
    pub fn take_redirects(&self) -> Vec<Route> {
        self.navigator.take()
    }

    /// Remember the address for the next login prompt.
    ///
    /// Only `last_email` is written back; command-line and environment
    /// overrides stay out of the saved file.
    pub fn remember_email(&mut self, email: &str) {
        if self.config.last_email.as_deref() == Some(email) {
            return;
        }
        self.config.last_email = Some(email.to_string());
        let result = Config::load_saved().and_then(|mut saved| {
            saved.last_email = Some(email.to_string());
            saved.save()
        });
        match result {
            Ok(()) => debug!("Saved last email"),
            Err(e) => warn!(error = %e, "Failed to save config"),
        }
    }

    /// Email from the command line, or the one used last time.
    pub fn email_or_last(&self, email: Option<String>) -> Option<String> {
        email.or_else(|| self.config.last_email.clone())
    }
}
