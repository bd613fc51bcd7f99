//! Field validation shared by the record drafts.
//!
//! Drafts are checked before anything is sent to the API, so invalid input
//! surfaces as `AtriumError::Validation` without a network round trip.

use crate::error::{AtriumError, Result};

/// Maximum length for any single text field (in characters).
pub const MAX_FIELD_LENGTH: usize = 255;

/// A required text field: non-blank, then the same rules as [`validate_text`].
///
/// The error reads "`<label>` is required." for a blank value.
pub fn require(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AtriumError::Validation(format!("{label} is required.")));
    }
    validate_text(label, value)
}

/// An optional text field; `None` and blank values always pass.
pub fn validate_optional(label: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => validate_text(label, v),
        _ => Ok(()),
    }
}

/// Rules:
/// - Must not exceed MAX_FIELD_LENGTH characters
/// - Must not contain control characters (including newlines)
pub fn validate_text(label: &str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if len > MAX_FIELD_LENGTH {
        return Err(AtriumError::Validation(format!(
            "{label} too long: {len} characters (max: {MAX_FIELD_LENGTH})"
        )));
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(AtriumError::Validation(format!(
            "{label} contains invalid control characters"
        )));
    }
    Ok(())
}

/// Trimmed value, or `None` when blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
