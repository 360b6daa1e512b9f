//! User models and registration rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, Result};

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_NAME_LENGTH: usize = 150;

/// Letters, digits and `.`, `@`, `+`, `-`, `_`.
static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// Registration payload that passed [`RegisterInput::validate`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl RegisterInput {
    pub fn validate(self) -> Result<Registration> {
        let mut errors = FieldErrors::new();

        let email = required(&mut errors, "email", self.email);
        if let Some(email) = &email {
            if email.chars().count() > MAX_EMAIL_LENGTH {
                errors.add("email", format!("Ensure this field has no more than {} characters.", MAX_EMAIL_LENGTH));
            } else if !is_valid_email(email) {
                errors.add("email", "Enter a valid email address.");
            }
        }

        let username = required(&mut errors, "username", self.username);
        if let Some(username) = &username {
            if username.chars().count() > MAX_NAME_LENGTH {
                errors.add("username", format!("Ensure this field has no more than {} characters.", MAX_NAME_LENGTH));
            } else if !is_valid_username(username) {
                errors.add(
                    "username",
                    "Username may contain only letters, digits and @/./+/-/_ characters.",
                );
            }
        }

        let first_name = required(&mut errors, "first_name", self.first_name);
        check_length(&mut errors, "first_name", first_name.as_deref());
        let last_name = required(&mut errors, "last_name", self.last_name);
        check_length(&mut errors, "last_name", last_name.as_deref());
        let password = match self.password {
            Some(password) if !password.is_empty() => Some(password),
            _ => {
                errors.add("password", "This field is required.");
                None
            }
        };

        match (email, username, first_name, last_name, password) {
            (Some(email), Some(username), Some(first_name), Some(last_name), Some(password))
                if errors.is_empty() =>
            {
                Ok(Registration {
                    email,
                    username,
                    first_name,
                    last_name,
                    password,
                })
            }
            _ => Err(crate::Error::Validation(errors)),
        }
    }
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_PATTERN.is_match(username)
}

/// Minimal shape check: one `@` with a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, "This field is required.");
            None
        }
    }
}

fn check_length(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        if value.chars().count() > MAX_NAME_LENGTH {
            errors.add(field, format!("Ensure this field has no more than {} characters.", MAX_NAME_LENGTH));
        }
    }
}
