//! Typed endpoint methods for the notekeeper backend.

use crate::models::{
    CompleteProfileRequest, EmailRequest, GoogleTokenRequest, LoginRequest, Note, NoteRequest,
    OtpRequest, ResetPasswordRequest, SignupRequest, TokenResponse, UserProfile,
};

use super::{ApiError, ApiRequest, AuthGateway};

/// Clone is cheap - it only wraps the shared gateway.
#[derive(Clone)]
pub struct ApiClient {
    gateway: AuthGateway,
}

impl ApiClient {
    pub fn new(gateway: AuthGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    // ===== Session =====

    pub async fn refresh(&self) -> Result<TokenResponse, ApiError> {
        self.gateway.refresh().await
    }

    pub async fn login(&self, body: &LoginRequest) -> Result<TokenResponse, ApiError> {
        self.gateway.json(ApiRequest::post("/auth/login").json(body)?).await
    }

    pub async fn send_login_otp(&self, body: &EmailRequest) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::post("/auth/send-otp-login").json(body)?).await
    }

    pub async fn verify_login_otp(&self, body: &OtpRequest) -> Result<TokenResponse, ApiError> {
        self.gateway.json(ApiRequest::post("/auth/verify-otp-login").json(body)?).await
    }

    pub async fn google_token(&self, body: &GoogleTokenRequest) -> Result<TokenResponse, ApiError> {
        self.gateway.json(ApiRequest::post("/auth/google/token").json(body)?).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::post("/auth/logout")).await
    }

    // ===== Profile =====

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.gateway.json(ApiRequest::get("/auth/me")).await
    }

    pub async fn complete_profile(&self, body: &CompleteProfileRequest) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::post("/auth/complete-profile").json(body)?).await
    }

    // ===== Registration =====

    pub async fn signup(&self, body: &SignupRequest) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::post("/auth/signup").json(body)?).await
    }

    pub async fn verify_signup_otp(&self, body: &OtpRequest) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::post("/auth/verify-otp").json(body)?).await
    }

    pub async fn resend_signup_otp(&self, body: &EmailRequest) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::post("/auth/resend-otp").json(body)?).await
    }

    // ===== Password recovery =====

    pub async fn forgot_password(&self, body: &EmailRequest) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::post("/auth/forgot-password").json(body)?).await
    }

    pub async fn reset_password(&self, body: &ResetPasswordRequest) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::post("/auth/reset-password").json(body)?).await
    }

    // ===== Notes =====

    pub async fn fetch_notes(&self) -> Result<Vec<Note>, ApiError> {
        self.gateway.json(ApiRequest::get("/notes")).await
    }

    pub async fn create_note(&self, content: &str) -> Result<Note, ApiError> {
        let body = NoteRequest { content: content.to_string() };
        self.gateway.json(ApiRequest::post("/notes").json(&body)?).await
    }

    pub async fn update_note(&self, id: &str, content: &str) -> Result<Note, ApiError> {
        let body = NoteRequest { content: content.to_string() };
        self.gateway
            .json(ApiRequest::patch(format!("/notes/{}", id)).json(&body)?)
            .await
    }

    pub async fn delete_note(&self, id: &str) -> Result<(), ApiError> {
        self.gateway.execute(ApiRequest::delete(format!("/notes/{}", id))).await
    }
}
