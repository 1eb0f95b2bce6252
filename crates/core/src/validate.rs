//! Field validation helpers shared by the domain crates.

use chrono::NaiveDate;

use crate::error::{DomainError, DomainResult};

pub fn non_empty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(field, "must be zero or greater"));
    }
    Ok(())
}

pub fn positive(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(field, "must be greater than zero"));
    }
    Ok(())
}

pub fn percentage(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(DomainError::validation(field, "must be between 0 and 100"));
    }
    Ok(())
}

/// `end` must not precede `start` when both are set.
pub fn date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> DomainResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(DomainError::validation(
            "end_date",
            "must not be before start_date",
        )),
        _ => Ok(()),
    }
}

pub fn http_url(field: &str, value: &str) -> DomainResult<()> {
    let v = value.trim();
    let rest = v
        .strip_prefix("https://")
        .or_else(|| v.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Ok(()),
        _ => Err(DomainError::validation(field, format!("`{v}` is not an http(s) URL"))),
    }
}
