//! Wire types exchanged with the notekeeper backend.
//!
//! - `TokenResponse` and the auth request bodies: login, OTP, federated
//!   sign-in, registration, password recovery, profile completion
//! - `UserProfile`: the signed-in user's account details
//! - `Note`: a personal note

pub mod auth;
pub mod note;
pub mod user;

pub use auth::{
    CompleteProfileRequest, EmailRequest, GoogleTokenRequest, LoginRequest, OtpRequest,
    ResetPasswordRequest, SignupRequest, TokenResponse,
};
pub use note::{Note, NoteRequest};
pub use user::UserProfile;
