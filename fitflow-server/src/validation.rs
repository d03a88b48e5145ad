//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use shared::error::{AppError, ErrorCode};
use shared::models::{GymCreate, GymUpdate, Location, OperatingHours};

// ── Text length limits ──────────────────────────────────────────────

/// Person and gym names
pub const MAX_NAME_LEN: usize = 200;

/// Adjustment reasons, notes
pub const MAX_NOTE_LEN: usize = 500;

/// Phone numbers, zip codes, dates
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

pub const MAX_FACILITIES: usize = 50;

// ── Helpers ─────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Minimal shape check: one `@` with non-empty local part and a dotted domain
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::with_message(ErrorCode::InvalidFormat, "Invalid email format")
            .with_detail("field", "email"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

/// Normalize a gym code to uppercase and check `[A-Z0-9]{3,16}` with at least one letter
pub fn normalize_gym_code(code: &str) -> Result<String, AppError> {
    let code = code.trim().to_ascii_uppercase();
    let valid = (3..=16).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && code.chars().any(|c| c.is_ascii_uppercase());
    if !valid {
        return Err(AppError::new(ErrorCode::InvalidGymCode).with_detail("gym_code", code));
    }
    Ok(code)
}

fn validate_hhmm(value: &str) -> bool {
    let Some((h, m)) = value.split_once(':') else {
        return false;
    };
    h.len() == 2
        && m.len() == 2
        && h.parse::<u8>().is_ok_and(|h| h < 24)
        && m.parse::<u8>().is_ok_and(|m| m < 60)
}

pub fn validate_operating_hours(hours: &OperatingHours) -> Result<(), AppError> {
    for (day, h) in hours.days() {
        if !validate_hhmm(&h.open) || !validate_hhmm(&h.close) {
            return Err(AppError::validation(format!(
                "operating hours for {day} must be HH:MM"
            ))
            .with_detail("field", "operating_hours"));
        }
    }
    Ok(())
}

pub fn validate_location(location: &Location) -> Result<(), AppError> {
    validate_required_text(&location.address, "location.address", MAX_ADDRESS_LEN)?;
    validate_required_text(&location.city, "location.city", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&location.state, "location.state", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&location.zip_code, "location.zip_code", MAX_SHORT_TEXT_LEN)?;
    if let Some(c) = &location.coordinates
        && !c.is_valid()
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "coordinates must satisfy -90 <= lat <= 90 and -180 <= lng <= 180",
        )
        .with_detail("field", "location.coordinates"));
    }
    Ok(())
}

fn validate_capacity(capacity: i64) -> Result<(), AppError> {
    if capacity < 1 {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "capacity must be at least 1")
            .with_detail("field", "capacity"));
    }
    Ok(())
}

fn validate_facilities(facilities: &[String]) -> Result<(), AppError> {
    if facilities.len() > MAX_FACILITIES {
        return Err(AppError::validation(format!("at most {MAX_FACILITIES} facilities")));
    }
    for f in facilities {
        validate_required_text(f, "facility", MAX_NAME_LEN)?;
    }
    Ok(())
}

pub fn validate_gym_create(data: &GymCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_email(&data.email)?;
    validate_location(&data.location)?;
    validate_capacity(data.capacity)?;
    validate_facilities(&data.facilities)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    if let Some(hours) = &data.operating_hours {
        validate_operating_hours(hours)?;
    }
    Ok(())
}

pub fn validate_gym_update(data: &GymUpdate) -> Result<(), AppError> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(location) = &data.location {
        validate_location(location)?;
    }
    if let Some(capacity) = data.capacity {
        validate_capacity(capacity)?;
    }
    if let Some(facilities) = &data.facilities {
        validate_facilities(facilities)?;
    }
    if let Some(hours) = &data.operating_hours {
        validate_operating_hours(hours)?;
    }
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Coordinates;

    #[test]
    fn gym_code_rules() {
        assert_eq!(normalize_gym_code(" fz001 ").unwrap(), "FZ001");
        assert_eq!(normalize_gym_code("GYM123456").unwrap(), "GYM123456");
        assert_eq!(normalize_gym_code("12345").unwrap_err().code, ErrorCode::InvalidGymCode);
        assert!(normalize_gym_code("AB").is_err());
        assert!(normalize_gym_code("FZ-001").is_err());
        assert!(normalize_gym_code("ABCDEFGHIJKLMNOPQ").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a b@c.co").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_minimum() {
        assert_eq!(validate_password("short").unwrap_err().code, ErrorCode::PasswordTooShort);
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn hours_and_coordinates() {
        let mut hours = OperatingHours::default();
        assert!(validate_operating_hours(&hours).is_ok());
        hours.sunday.close = "25:00".into();
        assert!(validate_operating_hours(&hours).is_err());

        let mut location = Location {
            address: "1 Main".into(),
            city: "X".into(),
            state: "Y".into(),
            zip_code: "1".into(),
            coordinates: Some(Coordinates { lat: 10.0, lng: 200.0 }),
        };
        assert_eq!(
            validate_location(&location).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        location.coordinates = None;
        assert!(validate_location(&location).is_ok());
    }
}
