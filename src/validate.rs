//! Login form checks. Permissive on purpose: there is no real credential
//! check behind them.

use serde::{Deserialize, Serialize};

pub const EMAIL_ERROR: &str = "Email must contain @ and be valid";
pub const PASSWORD_ERROR: &str = "Min 8 chars, 1 uppercase, 1 number";
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
}

impl User {
    /// Display name is everything before the first `@`.
    pub fn from_email(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            email: email.to_string(),
            name,
        }
    }
}

/// Contains both `@` and `.`.
pub fn is_valid_email(s: &str) -> bool {
    s.contains('@') && s.contains('.')
}

/// At least 8 characters, one ASCII uppercase letter and one digit.
pub fn is_valid_password(s: &str) -> bool {
    s.chars().count() >= MIN_PASSWORD_LEN
        && s.chars().any(|c| c.is_ascii_uppercase())
        && s.chars().any(|c| c.is_ascii_digit())
}

/// Field-level messages; `None` means the field passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check both fields; either all errors or the derived user.
    pub fn submit(&self) -> Result<User, FieldErrors> {
        let errors = FieldErrors {
            email: (!is_valid_email(&self.email)).then_some(EMAIL_ERROR),
            password: (!is_valid_password(&self.password)).then_some(PASSWORD_ERROR),
        };
        if errors.is_empty() {
            Ok(User::from_email(&self.email))
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert!(is_valid_email("a@b.com"));
        assert!(!is_valid_email("abc"));
        assert!(!is_valid_email("a@b"));
        assert!(is_valid_email(".@"));
    }

    #[test]
    fn password_rules() {
        assert!(is_valid_password("Abcdef12"));
        assert!(!is_valid_password("abcdef12"));
        assert!(!is_valid_password("Abcdefgh"));
        assert!(!is_valid_password("Ab1"));
    }

    #[test]
    fn submit_reports_each_failing_field() {
        let err = LoginForm::new("nope", "short").submit().unwrap_err();
        assert_eq!(err.email, Some(EMAIL_ERROR));
        assert_eq!(err.password, Some(PASSWORD_ERROR));

        let err = LoginForm::new("x@y.z", "short").submit().unwrap_err();
        assert_eq!(err.email, None);
        assert_eq!(err.password, Some(PASSWORD_ERROR));
    }

    #[test]
    fn submit_derives_display_name() {
        let user = LoginForm::new("user@test.com", "Passw0rd").submit().unwrap();
        assert_eq!(user.name, "user");
        assert_eq!(user.email, "user@test.com");
    }

    #[test]
    fn name_stops_at_first_at_sign() {
        assert_eq!(User::from_email("a@b@c.d").name, "a");
    }
}
