//! Login, registration, recovery and profile flows.
//!
//! Each flow validates its input locally, calls the backend through the
//! gateway, applies the result to the credential store and `SessionStore`,
//! and reports where the front end should go next.

use std::time::Instant;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{
    CompleteProfileRequest, EmailRequest, GoogleTokenRequest, LoginRequest, OtpRequest,
    ResetPasswordRequest, SignupRequest, TokenResponse, UserProfile,
};

use super::validate::{self, OtpCooldown};
use super::{Route, SessionStore};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Notification text for the user.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AuthError::Validation(message) => message.clone(),
            AuthError::Api(e) => e.user_message(fallback),
        }
    }
}

#[derive(Clone)]
pub struct AuthFlows {
    api: ApiClient,
    session: SessionStore,
}

impl AuthFlows {
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Store the issued credential and mark the session signed in.
    fn sign_in(&self, response: TokenResponse) -> Result<Route, AuthError> {
        let token = response
            .token()
            .ok_or_else(|| ApiError::InvalidResponse("login returned no access token".into()))?;
        self.api.gateway().credentials().set(token).map_err(ApiError::from)?;

        self.session.set_authenticated(true);
        self.session.set_requires_profile_completion(response.requires_profile_completion);
        info!(requires_profile_completion = response.requires_profile_completion, "Signed in");

        Ok(if response.requires_profile_completion {
            Route::CompleteProfile
        } else {
            Route::Dashboard
        })
    }

    // ===== Login =====

    pub async fn login(&self, email: &str, password: &str) -> Result<Route, AuthError> {
        let body = LoginRequest {
            email: validate::email(email)?,
            password: validate::password(password)?,
        };
        let response = self.api.login(&body).await?;
        self.sign_in(response)
    }

    /// Request a login code, honouring the resend cooldown.
    pub async fn send_login_otp(
        &self,
        email: &str,
        cooldown: &mut OtpCooldown,
    ) -> Result<(), AuthError> {
        let now = Instant::now();
        if !cooldown.ready(now) {
            return Err(AuthError::Validation(format!(
                "Wait {}s before requesting another code",
                cooldown.remaining(now).as_secs().max(1)
            )));
        }
        let body = EmailRequest {
            email: validate::email(email)?,
        };
        self.api.send_login_otp(&body).await?;
        cooldown.mark_sent(now);
        debug!("Login OTP sent");
        Ok(())
    }

    pub async fn verify_login_otp(&self, email: &str, otp: &str) -> Result<Route, AuthError> {
        let body = OtpRequest {
            email: validate::email(email)?,
            otp: validate::otp(otp)?,
        };
        let response = self.api.verify_login_otp(&body).await?;
        self.sign_in(response)
    }

    /// Exchange a federated provider credential for a session.
    pub async fn google_sign_in(&self, credential: &str) -> Result<Route, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::Validation("Missing Google credential".into()));
        }
        let body = GoogleTokenRequest {
            credential: credential.to_string(),
        };
        let response = self.api.google_token(&body).await?;
        self.sign_in(response)
    }

    /// Sign out locally whatever the backend says.
    pub async fn logout(&self) -> Route {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Logout request failed");
        }
        if let Err(e) = self.api.gateway().credentials().remove() {
            warn!(error = %e, "Failed to remove stored credential");
        }
        self.session.sign_out();
        info!("Signed out");
        Route::Login
    }

    // ===== Registration =====

    pub async fn signup(&self, name: &str, email: &str, dob: NaiveDate) -> Result<(), AuthError> {
        let body = SignupRequest {
            name: validate::name(name)?,
            email: validate::email(email)?,
            dob,
        };
        self.api.signup(&body).await?;
        Ok(())
    }

    pub async fn verify_signup_otp(&self, email: &str, otp: &str) -> Result<Route, AuthError> {
        let body = OtpRequest {
            email: validate::email(email)?,
            otp: validate::otp(otp)?,
        };
        self.api.verify_signup_otp(&body).await?;
        Ok(Route::Login)
    }

    pub async fn resend_signup_otp(&self, email: &str) -> Result<(), AuthError> {
        let body = EmailRequest {
            email: validate::email(email)?,
        };
        self.api.resend_signup_otp(&body).await?;
        Ok(())
    }

    // ===== Password recovery =====

    pub async fn forgot_password(&self, email: &str) -> Result<Route, AuthError> {
        let body = EmailRequest {
            email: validate::email(email)?,
        };
        self.api.forgot_password(&body).await?;
        Ok(Route::ResetPassword)
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<Route, AuthError> {
        let body = ResetPasswordRequest {
            email: validate::email(email)?,
            otp: validate::otp(otp)?,
            new_password: validate::password(new_password)?,
        };
        self.api.reset_password(&body).await?;
        Ok(Route::Login)
    }

    // ===== Profile =====

    pub async fn me(&self) -> Result<UserProfile, AuthError> {
        Ok(self.api.me().await?)
    }

    pub async fn complete_profile(&self, name: &str, dob: NaiveDate) -> Result<Route, AuthError> {
        let body = CompleteProfileRequest {
            name: validate::name(name)?,
            dob,
        };
        self.api.complete_profile(&body).await?;
        self.session.set_requires_profile_completion(false);
        Ok(Route::Dashboard)
    }
}
