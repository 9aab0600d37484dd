//! Validation rules shared by the profile editor and event data.
//!
//! Every function here is pure. Mutating entry points call them before
//! queuing anything, so a rejected call never touches pending state.

use crate::error::{code, ErrorCategory, SdkError};
use crate::types::{AttributeValue, TypedValue};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset};

pub const MAX_KEY_LENGTH: usize = 30;
pub const MAX_STRING_LENGTH: usize = 64;
pub const MAX_EVENT_NAME_LENGTH: usize = 30;
pub const MAX_EVENT_LABEL_LENGTH: usize = 200;
pub const MAX_IDENTIFIER_LENGTH: usize = 1024;
pub const MIN_LOCALE_CODE_LENGTH: usize = 2;
pub const MAX_DATE_YEAR: i32 = 9999;

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// An attribute key or tag collection name that matched `[a-z0-9_]{1,30}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AttributeKey(String);

impl AttributeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tag of 1 to 64 characters, case preserved.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("invalid key '{key}': expected 1 to 30 characters of [a-z0-9_]")]
    InvalidKey { key: String },
    #[error("invalid tag '{tag}': expected 1 to 64 characters")]
    InvalidTag { tag: String },
    #[error("invalid attribute value: {reason}")]
    InvalidAttributeValue { reason: &'static str },
    #[error("invalid event name '{name}': expected 1 to 30 characters of [a-zA-Z0-9_]")]
    InvalidEventName { name: String },
    #[error("invalid event label: expected 1 to 200 characters")]
    InvalidEventLabel,
    #[error("invalid {field} '{value}': expected at least 2 characters")]
    InvalidLocaleCode { field: &'static str, value: String },
    #[error("invalid custom identifier: expected 1 to 1024 characters")]
    InvalidIdentifier,
}

impl From<ValidationError> for SdkError {
    fn from(err: ValidationError) -> Self {
        let machine_code = match &err {
            ValidationError::InvalidKey { .. } => code::VALIDATION_INVALID_KEY,
            ValidationError::InvalidTag { .. } => code::VALIDATION_INVALID_TAG,
            ValidationError::InvalidAttributeValue { .. } => {
                code::VALIDATION_INVALID_ATTRIBUTE_VALUE
            }
            _ => code::VALIDATION_INVALID_ARGUMENT,
        };
        let sdk_err = SdkError::new(machine_code, ErrorCategory::Validation, err.to_string())
            .with_user_actionable(true);
        match err {
            ValidationError::InvalidKey { key } => {
                sdk_err.with_detail("key", JsonValue::String(key))
            }
            ValidationError::InvalidTag { tag } => {
                sdk_err.with_detail("tag", JsonValue::String(tag))
            }
            ValidationError::InvalidEventName { name } => {
                sdk_err.with_detail("name", JsonValue::String(name))
            }
            ValidationError::InvalidLocaleCode { field, .. } => {
                sdk_err.with_detail("field", JsonValue::String(field.to_owned()))
            }
            _ => sdk_err,
        }
    }
}

/// Accepted input that the native runtime may not store exactly as given.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ValidationWarning {
    /// Numbers with a fractional part may be handled with reduced precision.
    ReducedPrecision,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReducedPrecision => {
                f.write_str("numbers with a decimal part may be handled with reduced precision")
            }
        }
    }
}

/// A validated value plus any warnings raised while checking it.
#[derive(Clone, Debug, PartialEq)]
pub struct Checked<T> {
    pub value: T,
    pub warnings: Vec<ValidationWarning>,
}

impl<T> Checked<T> {
    fn clean(value: T) -> Self {
        Self { value, warnings: Vec::new() }
    }

    pub fn into_parts(self) -> (T, Vec<ValidationWarning>) {
        (self.value, self.warnings)
    }
}

pub fn validate_key(key: &str) -> Result<AttributeKey, ValidationError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if !valid {
        return Err(ValidationError::InvalidKey { key: key.to_owned() });
    }
    Ok(AttributeKey(key.to_owned()))
}

pub fn validate_tag(tag: &str) -> Result<Tag, ValidationError> {
    if tag.is_empty() || tag.chars().count() > MAX_STRING_LENGTH {
        return Err(ValidationError::InvalidTag { tag: tag.to_owned() });
    }
    Ok(Tag(tag.to_owned()))
}

pub fn validate_attribute_value(
    value: AttributeValue,
) -> Result<Checked<TypedValue>, ValidationError> {
    match value {
        AttributeValue::String(value) => {
            if value.is_empty() {
                return Err(ValidationError::InvalidAttributeValue {
                    reason: "strings must not be empty",
                });
            }
            if value.chars().count() > MAX_STRING_LENGTH {
                return Err(ValidationError::InvalidAttributeValue {
                    reason: "strings must not be longer than 64 characters",
                });
            }
            Ok(Checked::clean(TypedValue::String(value)))
        }
        AttributeValue::Number(value) => validate_number(value),
        AttributeValue::Boolean(value) => Ok(Checked::clean(TypedValue::Boolean(value))),
        AttributeValue::Date(value) => {
            Ok(Checked::clean(TypedValue::Date(validate_date(value)?)))
        }
    }
}

/// Dates travel as RFC 3339 in UTC, so they are normalized to UTC and must
/// land in years 0 to 9999 once there.
pub fn validate_date(date: OffsetDateTime) -> Result<OffsetDateTime, ValidationError> {
    date.checked_to_offset(UtcOffset::UTC)
        .filter(|utc| (0..=MAX_DATE_YEAR).contains(&utc.year()))
        .ok_or(ValidationError::InvalidAttributeValue {
            reason: "dates must fall between the years 0 and 9999 in UTC",
        })
}

fn validate_number(value: f64) -> Result<Checked<TypedValue>, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidAttributeValue { reason: "numbers must be finite" });
    }

    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        return Ok(Checked::clean(TypedValue::Number(serde_json::Number::from(value as i64))));
    }

    let number = serde_json::Number::from_f64(value)
        .ok_or(ValidationError::InvalidAttributeValue { reason: "numbers must be finite" })?;
    let warnings =
        if value.fract() != 0.0 { vec![ValidationWarning::ReducedPrecision] } else { Vec::new() };
    Ok(Checked { value: TypedValue::Number(number), warnings })
}

/// Event names follow the native runtime's rule: `[a-zA-Z0-9_]{1,30}`.
pub fn validate_event_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_EVENT_NAME_LENGTH
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if !valid {
        return Err(ValidationError::InvalidEventName { name: name.to_owned() });
    }
    Ok(())
}

pub fn validate_event_label(label: &str) -> Result<(), ValidationError> {
    if label.is_empty() || label.chars().count() > MAX_EVENT_LABEL_LENGTH {
        return Err(ValidationError::InvalidEventLabel);
    }
    Ok(())
}

/// `None` hands the value back to the native runtime's autodetection.
pub fn validate_locale_code(
    field: &'static str,
    code: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    let Some(code) = code else {
        return Ok(None);
    };
    let trimmed = code.trim();
    if trimmed.chars().count() < MIN_LOCALE_CODE_LENGTH {
        return Err(ValidationError::InvalidLocaleCode { field, value: code.to_owned() });
    }
    Ok(Some(trimmed.to_owned()))
}

/// `None` removes the custom identifier.
pub fn validate_identifier(identifier: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(identifier) = identifier else {
        return Ok(None);
    };
    if identifier.is_empty() || identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::InvalidIdentifier);
    }
    Ok(Some(identifier.to_owned()))
}
