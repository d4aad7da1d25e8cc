// src/utils/validation.rs

use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use validator::ValidationError;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone regex is valid"));

/// Phone numbers: optional leading `+`, then 7 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !PHONE_RE.is_match(phone) {
        return Err(ValidationError::new("invalid_phone")
            .with_message("Enter a valid phone number.".into()));
    }
    Ok(())
}

/// Validates that a string is a correctly formatted absolute URL.
pub fn validate_url_string(url: &str) -> Result<(), ValidationError> {
    if url.len() > 500 {
        return Err(ValidationError::new("url_too_long"));
    }
    if Url::parse(url).is_err() {
        return Err(ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Lowercases the domain part of an email address, leaving the local part untouched.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
