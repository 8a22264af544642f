//! Form input checks run before anything goes to the backend.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;

use super::AuthError;

/// Minimum wait between login OTP sends.
pub const OTP_RESEND_COOLDOWN: Duration = Duration::from_secs(30);

const OTP_LENGTH: usize = 6;
const MIN_PASSWORD_LENGTH: usize = 6;
const MIN_NAME_LENGTH: usize = 2;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn email(value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if EMAIL_RE.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(AuthError::Validation("Invalid email".into()))
    }
}

pub fn otp(value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.chars().count() == OTP_LENGTH && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(value.to_string())
    } else {
        Err(AuthError::Validation(format!("OTP must be {} digits", OTP_LENGTH)))
    }
}

pub fn password(value: &str) -> Result<String, AuthError> {
    if value.chars().count() >= MIN_PASSWORD_LENGTH {
        Ok(value.to_string())
    } else {
        Err(AuthError::Validation("Password too short".into()))
    }
}

pub fn name(value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.chars().count() >= MIN_NAME_LENGTH {
        Ok(value.to_string())
    } else {
        Err(AuthError::Validation(format!(
            "Name must be at least {} characters",
            MIN_NAME_LENGTH
        )))
    }
}

/// Tracks when a login OTP may be requested again.
#[derive(Debug, Clone, Default)]
pub struct OtpCooldown {
    last_sent: Option<Instant>,
}

impl OtpCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_sent(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }

    /// Time left before another send is allowed; zero when ready.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_sent {
            Some(sent) => OTP_RESEND_COOLDOWN.saturating_sub(now.saturating_duration_since(sent)),
            None => Duration::ZERO,
        }
    }

    pub fn ready(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert_eq!(email(" ada@example.com ").unwrap(), "ada@example.com");
        assert!(email("ada@example").is_err());
        assert!(email("ada example.com").is_err());
        assert!(email("").is_err());
    }

    #[test]
    fn test_otp() {
        assert_eq!(otp("123456").unwrap(), "123456");
        assert!(otp("12345").is_err());
        assert!(otp("1234567").is_err());
        assert!(otp("12a456").is_err());
    }

    #[test]
    fn test_password_and_name() {
        assert!(password("secret").is_ok());
        assert!(password("short").is_err());
        assert_eq!(name("  Al ").unwrap(), "Al");
        assert!(name("A").is_err());
    }

    #[test]
    fn test_otp_cooldown() {
        let start = Instant::now();
        let mut cooldown = OtpCooldown::new();
        assert!(cooldown.ready(start));

        cooldown.mark_sent(start);
        assert!(!cooldown.ready(start));
        assert_eq!(cooldown.remaining(start + Duration::from_secs(10)), Duration::from_secs(20));
        assert!(cooldown.ready(start + OTP_RESEND_COOLDOWN));
    }
}
