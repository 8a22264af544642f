use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body returned by every credential-producing endpoint and by the refresh call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TokenResponse {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(rename = "requiresProfileCompletion", default, deserialize_with = "truthy")]
    pub requires_profile_completion: bool,
}

impl TokenResponse {
    /// The issued credential, if the backend sent a usable one.
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Accept any JSON value for a flag: `null`, `false`, `0` and `""` read as false.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleTokenRequest {
    pub credential: String,
}

/// Dates of birth go over the wire as `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub dob: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteProfileRequest {
    pub name: String,
    pub dob: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_full() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"accessToken":"abc","requiresProfileCompletion":true}"#)
                .unwrap();
        assert_eq!(parsed.token(), Some("abc"));
        assert!(parsed.requires_profile_completion);
    }

    #[test]
    fn test_token_response_defaults() {
        let parsed: TokenResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.token(), None);
        assert!(!parsed.requires_profile_completion);

        let parsed: TokenResponse = serde_json::from_str(r#"{"accessToken":""}"#).unwrap();
        assert_eq!(parsed.token(), None);
    }

    #[test]
    fn test_profile_flag_coercion() {
        let flag = |json: &str| {
            serde_json::from_str::<TokenResponse>(&format!(
                r#"{{"requiresProfileCompletion":{}}}"#,
                json
            ))
            .unwrap()
            .requires_profile_completion
        };
        assert!(!flag("null"));
        assert!(!flag("0"));
        assert!(!flag(r#""""#));
        assert!(flag("1"));
        assert!(flag(r#""yes""#));
        assert!(flag("{}"));
    }

    #[test]
    fn test_request_wire_names() {
        let body = serde_json::to_value(ResetPasswordRequest {
            email: "a@b.co".into(),
            otp: "123456".into(),
            new_password: "hunter22".into(),
        })
        .unwrap();
        assert_eq!(body["newPassword"], "hunter22");

        let body = serde_json::to_value(SignupRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            dob: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
        })
        .unwrap();
        assert_eq!(body["dob"], "1990-12-10");
    }
}
