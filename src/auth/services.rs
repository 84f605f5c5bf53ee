use lazy_static::lazy_static;
use regex::Regex;

use crate::{auth::dto::RegisterRequest, error::AppError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Shape checks only; the email is kept exactly as sent.
pub(crate) fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if !is_valid_email(&req.email) {
        return Err(AppError::invalid_input("Invalid email"));
    }
    if req.password.is_empty() {
        return Err(AppError::invalid_input("Password is required"));
    }
    Ok(())
}
