//! Outgoing request description used by the `AuthGateway`.

use reqwest::Method;
use serde::Serialize;

use super::ApiError;

/// Path of the silent session renewal endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// How many times a request has been put on the wire.
///
/// A request starts as `First`; the gateway moves it to `Retried` before
/// resubmitting it after a refresh. A `Retried` request is never retried again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attempt {
    #[default]
    First,
    Retried,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    attempt: Attempt,
    bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            attempt: Attempt::First,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// The session renewal call. Never subject to refresh-and-retry.
    pub fn refresh() -> Self {
        Self::post(REFRESH_PATH).with_body(serde_json::json!({}))
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(self, body: &B) -> Result<Self, ApiError> {
        Ok(self.with_body(serde_json::to_value(body)?))
    }

    fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Credential pinned to this request, overriding the stored one.
    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    pub fn is_refresh(&self) -> bool {
        self.path.split('?').next() == Some(REFRESH_PATH)
    }

    /// Whether a 401 on this request may be recovered by refresh-and-retry.
    pub fn can_retry(&self) -> bool {
        !self.is_refresh() && self.attempt == Attempt::First
    }

    /// The resubmission of this request, carrying the renewed credential.
    pub fn into_retry(mut self, token: String) -> Self {
        self.attempt = Attempt::Retried;
        self.bearer = Some(token);
        self
    }
}
