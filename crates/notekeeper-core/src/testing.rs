//! Shared fixtures for unit tests: a mock backend plus a gateway wired to it.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::api::{ApiClient, AuthGateway};
use crate::auth::{CredentialStore, MemoryCredentialStore, Navigator, RecordingNavigator};
use crate::auth::SessionStore;

pub fn gateway_for(
    base_url: &str,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
) -> AuthGateway {
    AuthGateway::new(base_url, Duration::from_secs(5), credentials, navigator)
        .expect("failed to build test gateway")
}

pub struct TestContext {
    pub server: MockServer,
    pub gateway: AuthGateway,
    pub credentials: Arc<MemoryCredentialStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub session: SessionStore,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_store(MemoryCredentialStore::new()).await
    }

    pub async fn with_token(token: &str) -> Self {
        Self::with_store(MemoryCredentialStore::with_token(token)).await
    }

    async fn with_store(store: MemoryCredentialStore) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let server = MockServer::start().await;
        let credentials = Arc::new(store);
        let navigator = Arc::new(RecordingNavigator::new());
        let gateway = gateway_for(&server.uri(), credentials.clone(), navigator.clone());
        Self {
            server,
            gateway,
            credentials,
            navigator,
            session: SessionStore::new(),
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.gateway.clone())
    }

    pub fn stored_token(&self) -> Option<String> {
        self.credentials.get().expect("memory store never fails")
    }

    pub async fn mount_refresh(&self, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}
