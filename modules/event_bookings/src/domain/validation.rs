//! Input checks shared by the domain components.

use crate::domain::error::DomainError;

/// Non-blank text of at most `max` characters, returned trimmed.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    max_chars(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Optional text; blank collapses to `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, DomainError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            max_chars(field, v, max)?;
            Ok(Some(v.to_string()))
        }
    }
}

/// Normalized (trimmed, lowercase) email address.
pub fn email(value: &str, max: usize) -> Result<String, DomainError> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(DomainError::validation("email", "must not be empty"));
    }
    max_chars("email", &normalized, max)?;
    let Some((local, domain)) = normalized.split_once('@') else {
        return Err(DomainError::validation("email", "must contain '@'"));
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err(DomainError::validation("email", "is not a valid address"));
    }
    Ok(normalized)
}

fn max_chars(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(())
}
