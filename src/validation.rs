//! Field-level request validation.
//!
//! Handlers validate input before touching the store and return a 400
//! `Validation failed` envelope carrying the collected `{ field, message }`
//! entries.

use chrono::{DateTime, Utc};

use crate::error::FieldError;

/// Display names: 2-50 characters, letters and spaces only.
pub fn name(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    let trimmed = value.trim();
    if trimmed.len() < 2 || trimmed.len() > 50 {
        errors.push(FieldError::new(field, "Name must be between 2 and 50 characters"));
    } else if !trimmed.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        errors.push(FieldError::new(field, "Name can only contain letters and spaces"));
    }
}

pub fn email(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if !is_email(value) {
        errors.push(FieldError::new(field, "Please provide a valid email address"));
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Passwords: at least 6 characters with one lowercase, one uppercase and
/// one digit.
pub fn password(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.len() < 6 {
        errors.push(FieldError::new(field, "Password must be at least 6 characters"));
        return;
    }
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        errors.push(FieldError::new(
            field,
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        ));
    }
}

/// Required title with an inclusive maximum length.
pub fn title(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > max {
        errors.push(FieldError::new(
            field,
            format!("Title must be between 1 and {max} characters"),
        ));
    }
}

pub fn max_length(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize, what: &str) {
    if value.trim().len() > max {
        errors.push(FieldError::new(
            field,
            format!("{what} cannot be more than {max} characters"),
        ));
    }
}

/// Board backgrounds: hex color, CSS gradient, or http(s) URL.
pub fn background(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if is_hex_color(value)
        || value.starts_with("linear-gradient")
        || value.starts_with("radial-gradient")
        || is_http_url(value)
    {
        return;
    }
    errors.push(FieldError::new(
        field,
        "Background must be a valid hex color, gradient, or image URL",
    ));
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

pub fn url(errors: &mut Vec<FieldError>, field: &str, value: &str, what: &str) {
    if !is_http_url(value) {
        errors.push(FieldError::new(field, format!("{what} must be a valid URL")));
    }
}

pub fn member_role(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if crate::database::models::Role::parse_member(value).is_none() {
        errors.push(FieldError::new(field, "Invalid role"));
    }
}

pub fn position(errors: &mut Vec<FieldError>, field: &str, value: i32) {
    if value < 0 {
        errors.push(FieldError::new(field, "Position must be a non-negative integer"));
    }
}

/// Parse an RFC 3339 datetime, recording a field error on failure.
pub fn datetime(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    what: &str,
) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            errors.push(FieldError::new(field, format!("{what} must be a valid date")));
            None
        }
    }
}

/// Comment text: 1-1000 characters.
pub fn comment_text(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > 1000 {
        errors.push(FieldError::new(field, "Comment must be between 1 and 1000 characters"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(f: impl FnOnce(&mut Vec<FieldError>)) -> Vec<FieldError> {
        let mut errors = Vec::new();
        f(&mut errors);
        errors
    }

    #[test]
    fn valid_name_passes() {
        assert!(run(|e| name(e, "name", "Ada Lovelace")).is_empty());
    }

    #[test]
    fn short_or_symbolic_names_fail() {
        assert_eq!(run(|e| name(e, "name", "A")).len(), 1);
        assert_eq!(run(|e| name(e, "name", "Ada_99")).len(), 1);
    }

    #[test]
    fn email_shapes() {
        assert!(run(|e| email(e, "email", "user@example.com")).is_empty());
        assert_eq!(run(|e| email(e, "email", "userexample.com")).len(), 1);
        assert_eq!(run(|e| email(e, "email", "user@nodot")).len(), 1);
        assert_eq!(run(|e| email(e, "email", "@example.com")).len(), 1);
    }

    #[test]
    fn password_strength() {
        assert!(run(|e| password(e, "password", "Abcde1")).is_empty());
        assert_eq!(run(|e| password(e, "password", "abc")).len(), 1);
        assert_eq!(run(|e| password(e, "password", "alllowercase1")).len(), 1);
        assert_eq!(run(|e| password(e, "password", "NODIGITS")).len(), 1);
    }

    #[test]
    fn title_bounds() {
        assert!(run(|e| title(e, "title", "Sprint 12", 100)).is_empty());
        assert_eq!(run(|e| title(e, "title", "   ", 100)).len(), 1);
        assert_eq!(run(|e| title(e, "title", &"x".repeat(101), 100)).len(), 1);
    }

    #[test]
    fn background_accepts_hex_gradient_and_url() {
        assert!(run(|e| background(e, "background", "#0079bf")).is_empty());
        assert!(run(|e| background(e, "background", "#abc")).is_empty());
        assert!(run(|e| background(e, "background", "linear-gradient(#fff, #000)")).is_empty());
        assert!(run(|e| background(e, "background", "https://img.example.com/bg.png")).is_empty());
        assert_eq!(run(|e| background(e, "background", "blue")).len(), 1);
        assert_eq!(run(|e| background(e, "background", "#12345")).len(), 1);
    }

    #[test]
    fn roles_are_restricted() {
        assert!(run(|e| member_role(e, "role", "editor")).is_empty());
        assert_eq!(run(|e| member_role(e, "role", "owner")).len(), 1);
        assert_eq!(run(|e| member_role(e, "role", "root")).len(), 1);
    }

    #[test]
    fn datetime_parses_rfc3339() {
        let mut errors = Vec::new();
        assert!(datetime(&mut errors, "dueDate", "2026-03-01T12:00:00Z", "Due date").is_some());
        assert!(errors.is_empty());
        assert!(datetime(&mut errors, "dueDate", "next tuesday", "Due date").is_none());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn negative_position_fails() {
        assert_eq!(run(|e| position(e, "position", -1)).len(), 1);
        assert!(run(|e| position(e, "position", 0)).is_empty());
    }
}
