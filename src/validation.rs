//! Request-body checks. Each returns the first failing rule as a
//! [`AppError::Validation`] so the client sees one message, not a list.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Length is counted in characters, not bytes.
pub fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(AppError::Validation(format!(
            "\"{field}\" is not allowed to be empty"
        )));
    }
    if len < min {
        return Err(AppError::Validation(format!(
            "\"{field}\" length must be at least {min} characters long"
        )));
    }
    if len > max {
        return Err(AppError::Validation(format!(
            "\"{field}\" length must be less than or equal to {max} characters long"
        )));
    }
    Ok(())
}

pub fn check_email(field: &str, value: &str) -> Result<(), AppError> {
    check_len(field, value, 6, 100)?;
    if !is_valid_email(value) {
        return Err(AppError::Validation(format!(
            "\"{field}\" must be a valid email"
        )));
    }
    Ok(())
}

pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::Validation(format!("\"{field}\" must be a number")));
    }
    if value < min {
        return Err(AppError::Validation(format!(
            "\"{field}\" must be greater than or equal to {min}"
        )));
    }
    if value > max {
        return Err(AppError::Validation(format!(
            "\"{field}\" must be less than or equal to {max}"
        )));
    }
    Ok(())
}
