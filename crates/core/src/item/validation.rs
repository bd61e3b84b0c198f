//! Validated extraction of typed values from item attributes.
//!
//! Every entity codec goes through these helpers, so a missing or mistyped
//! attribute always fails the same way: `InvalidEntityData` with a message of
//! the shape `field "<name>" <problem>`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::storage::{RepositoryError, Result};

use super::{now_millis, AttributeValue};

/// Largest integer an `N` attribute can carry without losing precision.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Constraints for [`validate_string_field`].
#[derive(Debug, Clone, Default)]
pub struct StringRules {
    pub allow_empty: bool,
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
}

impl StringRules {
    pub fn allow_empty() -> Self {
        Self {
            allow_empty: true,
            ..Self::default()
        }
    }

    pub fn bounded(min_length: usize, max_length: usize) -> Self {
        Self {
            allow_empty: false,
            min_length: Some(min_length),
            max_length: Some(max_length),
        }
    }
}

/// Constraints for [`validate_number_field`].
#[derive(Debug, Clone, Default)]
pub struct NumberRules {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
}

impl NumberRules {
    pub fn integer() -> Self {
        Self {
            integer: true,
            ..Self::default()
        }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            integer: false,
        }
    }

    pub fn integer_range(min: f64, max: f64) -> Self {
        Self {
            integer: true,
            ..Self::range(min, max)
        }
    }
}

/// Constraints for [`validate_timestamp_field`].
#[derive(Debug, Clone)]
pub struct TimestampRules {
    pub allow_future: bool,
}

impl Default for TimestampRules {
    fn default() -> Self {
        Self { allow_future: true }
    }
}

impl TimestampRules {
    pub fn past_only() -> Self {
        Self {
            allow_future: false,
        }
    }
}

/// A closed set of string values stored in a single attribute.
pub trait AttributeEnum: Sized + Copy + 'static {
    const VARIANTS: &'static [Self];

    fn as_str(&self) -> &'static str;
}

fn invalid(field: &str, problem: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::InvalidEntityData(format!("field \"{field}\" {problem}"))
}

fn present<'a>(value: Option<&'a AttributeValue>, field: &str) -> Result<&'a AttributeValue> {
    value.ok_or_else(|| invalid(field, "is missing"))
}

/// Treats an absent or `Null` attribute as `None`, validating anything else.
pub fn optional<T>(
    value: Option<&AttributeValue>,
    validate: impl FnOnce(Option<&AttributeValue>) -> Result<T>,
) -> Result<Option<T>> {
    match value {
        None | Some(AttributeValue::Null) => Ok(None),
        Some(value) => validate(Some(value)).map(Some),
    }
}

pub fn validate_string_field(
    value: Option<&AttributeValue>,
    field: &str,
    rules: &StringRules,
) -> Result<String> {
    let value = present(value, field)?;
    let s = value
        .as_s()
        .ok_or_else(|| invalid(field, format!("must be a string, got {}", value.type_name())))?;

    if !rules.allow_empty && s.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }

    let length = s.chars().count();
    if let Some(min) = rules.min_length {
        if length < min {
            return Err(invalid(field, format!("must be at least {min} characters")));
        }
    }
    if let Some(max) = rules.max_length {
        if length > max {
            return Err(invalid(field, format!("must be at most {max} characters")));
        }
    }

    Ok(s.to_string())
}

pub fn validate_number_field(
    value: Option<&AttributeValue>,
    field: &str,
    rules: &NumberRules,
) -> Result<f64> {
    let value = present(value, field)?;
    let n = value
        .as_n()
        .ok_or_else(|| invalid(field, format!("must be a number, got {}", value.type_name())))?;

    if n.is_nan() {
        return Err(invalid(field, "must be a finite number (NaN)"));
    }
    if n.is_infinite() {
        return Err(invalid(field, "must be a finite number (Infinity)"));
    }
    if rules.integer && n.fract() != 0.0 {
        return Err(invalid(field, "must be an integer"));
    }
    if let Some(min) = rules.min {
        if n < min {
            return Err(invalid(field, format!("must be at least {min}")));
        }
    }
    if let Some(max) = rules.max {
        if n > max {
            return Err(invalid(field, format!("must be at most {max}")));
        }
    }

    Ok(n)
}

pub fn validate_enum_field<T: AttributeEnum>(value: Option<&AttributeValue>, field: &str) -> Result<T> {
    let raw = present(value, field)?.as_s();

    raw.and_then(|raw| T::VARIANTS.iter().copied().find(|v| v.as_str() == raw))
        .ok_or_else(|| {
            let allowed: Vec<&str> = T::VARIANTS.iter().map(AttributeEnum::as_str).collect();
            invalid(field, format!("must be one of: {}", allowed.join(", ")))
        })
}

pub fn validate_boolean_field(value: Option<&AttributeValue>, field: &str) -> Result<bool> {
    let value = present(value, field)?;
    value
        .as_bool()
        .ok_or_else(|| invalid(field, format!("must be a boolean, got {}", value.type_name())))
}

pub fn validate_string_list_field(value: Option<&AttributeValue>, field: &str) -> Result<Vec<String>> {
    let value = present(value, field)?;
    let list = value
        .as_list()
        .ok_or_else(|| invalid(field, format!("must be a list, got {}", value.type_name())))?;

    list.iter()
        .enumerate()
        .map(|(index, v)| {
            v.as_s()
                .map(str::to_string)
                .ok_or_else(|| invalid(field, format!("must contain only strings (index {index})")))
        })
        .collect()
}

/// Validates an epoch-millisecond timestamp against the current time.
///
/// Accepts integer epoch millis, or an ISO-8601 string (RFC 3339,
/// `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC, or `YYYY-MM-DD`) which is
/// normalized to epoch millis. Legacy items store timestamps as strings.
pub fn validate_timestamp_field(
    value: Option<&AttributeValue>,
    field: &str,
    rules: &TimestampRules,
) -> Result<i64> {
    validate_timestamp_field_at(value, field, rules, now_millis())
}

/// [`validate_timestamp_field`] with an explicit "now" for the future check.
pub fn validate_timestamp_field_at(
    value: Option<&AttributeValue>,
    field: &str,
    rules: &TimestampRules,
    now: i64,
) -> Result<i64> {
    let value = present(value, field)?;

    let millis = match value {
        AttributeValue::N(n) => {
            if !n.is_finite() || n.fract() != 0.0 {
                return Err(invalid(field, "must be an integer timestamp"));
            }
            if n.abs() > MAX_SAFE_INTEGER {
                return Err(invalid(field, "is out of the timestamp range"));
            }
            *n as i64
        }
        AttributeValue::S(s) => {
            parse_timestamp_str(s).ok_or_else(|| invalid(field, "is not a valid timestamp string"))?
        }
        other => {
            return Err(invalid(
                field,
                format!("must be a timestamp (number or string), got {}", other.type_name()),
            ))
        }
    };

    if millis < 0 {
        return Err(invalid(field, "must not be a negative timestamp"));
    }
    if !rules.allow_future && millis > now {
        return Err(invalid(field, "must not be in the future"));
    }

    Ok(millis)
}

fn parse_timestamp_str(s: &str) -> Option<i64> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}
