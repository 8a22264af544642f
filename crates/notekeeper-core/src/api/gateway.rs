//! HTTP client wrapper that authorizes every request and renews the session
//! transparently.
//!
//! Request side: the stored credential, if any, goes out as
//! `Authorization: Bearer <token>`.
//!
//! Response side: a 401 on a request that is neither the refresh call nor a
//! retry triggers one `POST /auth/refresh`. On success the new credential is
//! stored and the original request is resubmitted once with it. On failure
//! the credential is removed, the navigator is sent to the login route, and
//! the refresh error is returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::auth::{CredentialStore, Navigator, Route};
use crate::models::TokenResponse;

use super::{ApiError, ApiRequest};

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Clone is cheap - the client, credential store and navigator are all shared.
#[derive(Clone)]
pub struct AuthGateway {
    client: Client,
    base_url: Arc<str>,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthGateway {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        // The cookie store carries the long-lived session cookie the refresh
        // endpoint relies on.
        let client = Client::builder()
            .timeout(request_timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            credentials,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Header value the request interceptor attaches, if any.
    ///
    /// A credential pinned to the request wins over the stored one. A failing
    /// store reads as "no credential".
    pub fn authorization(&self, request: &ApiRequest) -> Option<String> {
        let token = match request.bearer() {
            Some(token) => Some(token.to_string()),
            None => match self.credentials.get() {
                Ok(token) => token,
                Err(e) => {
                    warn!(error = %e, "Failed to read stored credential, sending unauthenticated");
                    None
                }
            },
        };
        token.map(|t| format!("Bearer {}", t))
    }

    /// Put one request on the wire, whatever the response status.
    async fn dispatch(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let url = self.url(request.path());
        let mut builder = self.client.request(request.method().clone(), &url);
        if let Some(value) = self.authorization(request) {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        debug!(method = %request.method(), url = %url, attempt = ?request.attempt(), "Sending request");
        Ok(builder.send().await?)
    }

    /// Send a request through both interceptors.
    ///
    /// Returns the successful response, or the error that ended the exchange.
    /// Never puts the same request on the wire more than twice.
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ApiError> {
        let mut request = request;
        loop {
            let response = self.dispatch(&request).await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }
            if status != StatusCode::UNAUTHORIZED || !request.can_retry() {
                debug!(path = request.path(), status = %status, "Request failed");
                return Err(ApiError::from_response(response).await);
            }

            debug!(path = request.path(), "Unauthorized, attempting session refresh");
            let token = match self.renew_credential().await {
                Ok(token) => token,
                Err(e) => {
                    error!(error = %e, "Refresh error");
                    self.discard_session();
                    return Err(ApiError::RefreshFailed(Box::new(e)));
                }
            };
            request = request.into_retry(token);
        }
    }

    /// Call the refresh endpoint once. No retry, no navigation, no storage.
    pub async fn refresh(&self) -> Result<TokenResponse, ApiError> {
        let response = self.dispatch(&ApiRequest::refresh()).await?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(TokenResponse::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Refresh and store the issued credential.
    async fn renew_credential(&self) -> Result<String, ApiError> {
        let refreshed = self.refresh().await?;
        let token = refreshed
            .token()
            .ok_or_else(|| ApiError::InvalidResponse("refresh returned no access token".into()))?
            .to_string();
        self.credentials.set(&token)?;
        debug!("Session refreshed");
        Ok(token)
    }

    fn discard_session(&self) {
        if let Err(e) = self.credentials.remove() {
            warn!(error = %e, "Failed to remove stored credential");
        }
        self.navigator.navigate(Route::Login);
    }

    /// Send and decode a JSON response body.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path().to_string();
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    /// Send, discarding any response body.
    pub async fn execute(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.send(request).await?;
        Ok(())
    }
}
