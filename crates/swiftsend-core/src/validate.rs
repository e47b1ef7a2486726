//! Client-side field validation for the auth forms.
//!
//! These rules run before any network call; a request only goes on the wire
//! once the local checks pass, so validation failures never surface through
//! `ApiError`.

use chrono::{Datelike, NaiveDate, Utc};

use crate::models::RegisterRequest;

const MAX_NAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 255;
const MIN_PASSWORD_LENGTH: usize = 8;
const MIN_REGISTRATION_AGE_YEARS: i32 = 18;

/// Length of the one-time codes delivered out-of-band
const OTP_LENGTH: usize = 6;

/// A field-level validation failure, keyed for inline display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".into());
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err("Email must be 255 characters or fewer".into());
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(' ')
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err("Enter a valid email address".into());
    }
    Ok(())
}

/// E.164 US format: +1 followed by 10 digits, area code 2-9.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone number is required".into());
    }
    let valid = phone.len() == 12
        && phone.starts_with("+1")
        && phone[2..].chars().all(|c| c.is_ascii_digit())
        && (b'2'..=b'9').contains(&phone.as_bytes()[2]);
    if !valid {
        return Err("Enter a valid US phone number (e.g. +12025551234)".into());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 8 characters".into());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number".into());
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err("Password must contain at least one special character".into());
    }
    Ok(())
}

/// Expects `YYYY-MM-DD`; the account holder must be at least 18.
pub fn validate_date_of_birth(date_of_birth: &str) -> Result<(), String> {
    if date_of_birth.is_empty() {
        return Err("Date of birth is required".into());
    }
    let Ok(dob) = NaiveDate::parse_from_str(date_of_birth, "%Y-%m-%d") else {
        return Err("Enter a valid date of birth (YYYY-MM-DD)".into());
    };
    if !is_at_least_18(dob) {
        return Err("You must be at least 18 years old to register".into());
    }
    Ok(())
}

fn is_at_least_18(dob: NaiveDate) -> bool {
    let today = Utc::now().date_naive();
    let year = today.year() - MIN_REGISTRATION_AGE_YEARS;
    // Same calendar day 18 years ago; Feb 29 falls back to Feb 28.
    let cutoff = today
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .unwrap_or(today);
    dob <= cutoff
}

/// One-time codes are exactly six digits.
pub fn validate_otp(code: &str) -> Result<(), String> {
    if code.len() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err("Enter the 6-digit code".into());
    }
    Ok(())
}

/// Validate the whole registration form, reporting every failing field.
pub fn validate_registration(req: &RegisterRequest, confirm_password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if req.first_name.is_empty() {
        errors.push(FieldError::new("first_name", "First name is required"));
    } else if req.first_name.len() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "first_name",
            "First name must be 50 characters or fewer",
        ));
    }

    if req.last_name.is_empty() {
        errors.push(FieldError::new("last_name", "Last name is required"));
    } else if req.last_name.len() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "last_name",
            "Last name must be 50 characters or fewer",
        ));
    }

    if let Err(message) = validate_email(&req.email) {
        errors.push(FieldError::new("email", message));
    }
    if let Err(message) = validate_phone(&req.phone) {
        errors.push(FieldError::new("phone", message));
    }
    if let Err(message) = validate_date_of_birth(&req.date_of_birth) {
        errors.push(FieldError::new("date_of_birth", message));
    }
    if let Err(message) = validate_password(&req.password) {
        errors.push(FieldError::new("password", message));
    }

    if confirm_password.is_empty() {
        errors.push(FieldError::new(
            "confirm_password",
            "Please confirm your password",
        ));
    } else if req.password != confirm_password {
        errors.push(FieldError::new("confirm_password", "Passwords do not match"));
    }

    if !req.agreed_to_terms {
        errors.push(FieldError::new(
            "agreed_to_terms",
            "You must accept the terms and conditions to continue",
        ));
    }

    errors
}

/// Validate the login form.
pub fn validate_login(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Err(message) = validate_email(email) {
        errors.push(FieldError::new("email", message));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    errors
}
