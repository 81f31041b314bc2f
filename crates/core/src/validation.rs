//! Form checks run before a submission reaches the backend. They exist for
//! fast feedback only; the backend's own constraints remain authoritative.

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::errors::{CoachError, CoachResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_GENERATE_WEEKS: i32 = 12;

fn invalid(message: impl Into<String>) -> CoachError {
    CoachError::Validation(message.into())
}

pub fn validate_email(email: &str) -> CoachResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }
    if !email.contains('@') {
        return Err(invalid("Please enter a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str, confirm: &str) -> CoachResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password != confirm {
        return Err(invalid("Passwords do not match"));
    }
    Ok(())
}

pub fn validate_required(field: &str, value: &str) -> CoachResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Trimmed message body, or `None` when there is nothing to send.
pub fn message_content(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn validate_template(
    weekday: i16,
    start: NaiveTime,
    end: NaiveTime,
    slot_minutes: i32,
) -> CoachResult<()> {
    if !(0..=6).contains(&weekday) {
        return Err(invalid("Weekday must be between 0 (Sunday) and 6 (Saturday)"));
    }
    if start >= end {
        return Err(invalid("Start time must be before end time"));
    }
    if !(15..=240).contains(&slot_minutes) {
        return Err(invalid("Slot length must be between 15 and 240 minutes"));
    }
    let window = (end - start).num_minutes();
    if window < i64::from(slot_minutes) {
        return Err(invalid("Availability window is shorter than one slot"));
    }
    Ok(())
}

pub fn validate_weeks(weeks: i32) -> CoachResult<()> {
    if !(1..=MAX_GENERATE_WEEKS).contains(&weeks) {
        return Err(invalid(format!(
            "Weeks must be between 1 and {}",
            MAX_GENERATE_WEEKS
        )));
    }
    Ok(())
}

pub fn validate_time_zone(name: &str) -> CoachResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| invalid(format!("Unknown time zone: {}", name)))
}

pub fn validate_measurement(field: &str, value: Option<i32>) -> CoachResult<()> {
    match value {
        Some(v) if v <= 0 => Err(invalid(format!("{} must be positive", field))),
        _ => Ok(()),
    }
}
