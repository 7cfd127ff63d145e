//! Login and signup flows.
//!
//! Signup validation runs locally, strictly ordered and short-circuiting,
//! before any request goes out: passwords match, then password length,
//! then terms acceptance. Both flows persist the profile only on success
//! and re-prompt on failure, so the "form" is interactive again on every
//! exit path.

use std::fmt;

use crate::api::client::CounselorClient;
use crate::api::{ApiError, LoginResponse, SignupRequest, SignupResponse};
use crate::core::profile::{Profile, ProfileStore};

mod ui;

use self::ui::{prompt_line, prompt_yes_no};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    PasswordMismatch,
    PasswordTooShort,
    TermsNotAccepted,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ValidationError::PasswordMismatch => "Passwords do not match",
            ValidationError::PasswordTooShort => "Password must be at least 8 characters",
            ValidationError::TermsNotAccepted => "Please accept the Terms & Conditions",
        };
        write!(f, "{message}")
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
}

/// Ordered, short-circuiting validation: the first failing check wins and
/// the request is never sent.
pub fn validate_signup(form: &SignupForm) -> Result<(), ValidationError> {
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if !form.accepted_terms {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(())
}

fn profile_from_login(response: LoginResponse) -> Profile {
    Profile {
        token: response.access_token,
        username: response.username,
        recent_summaries: response.recent_summaries.unwrap_or_default(),
    }
}

fn profile_from_signup(response: SignupResponse) -> Profile {
    Profile {
        token: response.access_token,
        username: response.username,
        recent_summaries: Vec::new(),
    }
}

/// Interactive login. Returns the persisted profile, or `None` when the
/// user cancels with an empty username.
pub async fn login_flow(
    client: &CounselorClient,
    store: &ProfileStore,
) -> Result<Option<Profile>, Box<dyn std::error::Error>> {
    loop {
        let username = prompt_line("Username: ")?;
        if username.is_empty() {
            return Ok(None);
        }
        let password = prompt_line("Password: ")?;

        match client.login(&username, &password).await {
            Ok(response) => {
                let profile = profile_from_login(response);
                store.save(&profile)?;
                println!("Welcome back, {}.", profile.username);
                return Ok(Some(profile));
            }
            Err(ApiError::Network(message)) => {
                tracing::debug!(error = %message, "login request failed");
                eprintln!("Login failed: {message}");
            }
            Err(err) => {
                eprintln!("{err}");
            }
        }
    }
}

/// Interactive signup with auto-login on success. Returns the persisted
/// profile, or `None` when the user cancels with an empty username.
pub async fn signup_flow(
    client: &CounselorClient,
    store: &ProfileStore,
) -> Result<Option<Profile>, Box<dyn std::error::Error>> {
    loop {
        let username = prompt_line("Username: ")?;
        if username.is_empty() {
            return Ok(None);
        }
        let email = prompt_line("Email: ")?;
        let password = prompt_line("Password: ")?;
        let confirm_password = prompt_line("Confirm password: ")?;
        let accepted_terms = prompt_yes_no("Accept the Terms & Conditions?")?;

        let form = SignupForm {
            username,
            email,
            password,
            confirm_password,
            accepted_terms,
        };
        if let Err(err) = validate_signup(&form) {
            eprintln!("{err}");
            continue;
        }

        let request = SignupRequest {
            username: form.username,
            email: form.email,
            password: form.password,
        };
        match client.signup(&request).await {
            Ok(response) => {
                let profile = profile_from_signup(response);
                store.save(&profile)?;
                println!("Account created. Welcome, {}.", profile.username);
                return Ok(Some(profile));
            }
            Err(ApiError::Network(message)) => {
                tracing::debug!(error = %message, "signup request failed");
                eprintln!("Signup failed: {message}");
            }
            Err(err) => {
                eprintln!("{err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SessionSummary;
    use tempfile::TempDir;

    fn form(password: &str, confirm: &str, terms: bool) -> SignupForm {
        SignupForm {
            username: "sam".to_string(),
            email: "sam@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            accepted_terms: terms,
        }
    }

    #[test]
    fn mismatched_passwords_fail_before_the_length_check() {
        // "abc" would also fail the length check; the mismatch must win.
        let err = validate_signup(&form("abc", "xyz", true)).unwrap_err();
        assert_eq!(err, ValidationError::PasswordMismatch);
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn short_passwords_fail_before_the_terms_check() {
        let err = validate_signup(&form("short", "short", false)).unwrap_err();
        assert_eq!(err, ValidationError::PasswordTooShort);
        assert_eq!(err.to_string(), "Password must be at least 8 characters");
    }

    #[test]
    fn unaccepted_terms_fail_last() {
        let err = validate_signup(&form("long enough", "long enough", false)).unwrap_err();
        assert_eq!(err, ValidationError::TermsNotAccepted);
        assert_eq!(err.to_string(), "Please accept the Terms & Conditions");
    }

    #[test]
    fn valid_form_passes() {
        assert!(validate_signup(&form("long enough", "long enough", true)).is_ok());
    }

    #[test]
    fn login_response_becomes_a_complete_profile() {
        let response = LoginResponse {
            access_token: "tok".to_string(),
            username: "sam".to_string(),
            recent_summaries: Some(vec![SessionSummary {
                summary: "Last time we talked about sleep.".to_string(),
            }]),
        };
        let profile = profile_from_login(response);
        assert_eq!(profile.token, "tok");
        assert_eq!(profile.username, "sam");
        assert_eq!(
            profile.latest_summary(),
            Some("Last time we talked about sleep.")
        );
    }

    #[test]
    fn signup_profile_starts_without_summaries() {
        let response = SignupResponse {
            access_token: "tok".to_string(),
            username: "sam".to_string(),
        };
        let profile = profile_from_signup(response);
        assert!(profile.recent_summaries.is_empty());
    }

    #[test]
    fn profile_persists_only_on_explicit_save() {
        // A rejected login never reaches `save`, so the store must still
        // be empty afterwards.
        let dir = TempDir::new().expect("temp dir");
        let store = ProfileStore::at(dir.path().join("profile.toml"));
        assert!(store.load().expect("load").is_none());

        let profile = profile_from_signup(SignupResponse {
            access_token: "tok".to_string(),
            username: "sam".to_string(),
        });
        store.save(&profile).expect("save");
        assert!(store.load().expect("load").is_some());
    }
}
