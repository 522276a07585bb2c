//! Login and registration form checks

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::dashboard::Role;

/// Rejected form input, carrying the message shown above the form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please check your input.")]
    CheckInput,
}

/// Login form
#[derive(Debug, Clone, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingFields);
        }

        if !is_valid_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }

        Ok(())
    }
}

/// Registration form; clients name a company, users give their full name
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub company_name: String,
}

impl RegisterForm {
    pub fn validate(&self, role: Role) -> Result<(), FormError> {
        if self.email.is_empty()
            || self.password.is_empty()
            || self.password != self.confirm_password
        {
            return Err(FormError::CheckInput);
        }

        if role == Role::Client && self.company_name.is_empty() {
            return Err(FormError::CheckInput);
        }

        Ok(())
    }
}

/// Validate email
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
    });

    regex.is_match(email)
}
