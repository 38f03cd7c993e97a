use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use std::fmt;
use std::str::FromStr;

/// Fractional digits stored by the NUMERIC(19, 2) value columns.
pub const VALUE_SCALE: i64 = 2;
/// Integer digits left once two are reserved for the fraction.
pub const VALUE_MAX_INTEGER_DIGITS: usize = 17;
pub const AMOUNT_INPUT_MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_period(from: DateTime<Utc>, to: DateTime<Utc>) -> ValidationResult {
    if from > to {
        return Err(ValidationError::new(
            "period",
            format!(
                "period_from ({}) must not be after period_to ({})",
                from.to_rfc3339(),
                to.to_rfc3339()
            ),
        ));
    }

    Ok(())
}

/// Values are signed; refunds and adjustments are negative.
///
/// Works on the unscaled digits and the exponent only; rescaling a value with
/// an extreme exponent would allocate a power of ten of that size.
pub fn validate_value(value: &BigDecimal) -> ValidationResult {
    let (unscaled, scale) = value.as_bigint_and_exponent();
    let unscaled = unscaled.to_string();
    let digits = unscaled.trim_start_matches('-');
    if digits == "0" {
        return Ok(());
    }

    let trailing_zeros = (digits.len() - digits.trim_end_matches('0').len()) as i64;
    let fraction_digits = scale - trailing_zeros.min(scale.max(0));
    if fraction_digits > VALUE_SCALE {
        return Err(ValidationError::new(
            "value",
            format!("must have at most {} fractional digits", VALUE_SCALE),
        ));
    }

    let integer_digits = digits.len() as i64 - scale;
    if integer_digits > VALUE_MAX_INTEGER_DIGITS as i64 {
        return Err(ValidationError::new(
            "value",
            format!("must have at most {} integer digits", VALUE_MAX_INTEGER_DIGITS),
        ));
    }

    Ok(())
}

/// Plain decimal notation only: optional minus sign, digits, optional fraction.
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    !integer.is_empty()
        && integer.bytes().all(|b| b.is_ascii_digit())
        && fraction.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

pub fn parse_value(raw: &str) -> Result<BigDecimal, ValidationError> {
    let raw = sanitize_string(raw);
    validate_required("value", &raw)?;
    validate_max_len("value", &raw, AMOUNT_INPUT_MAX_LEN)?;

    if !is_plain_decimal(&raw) {
        return Err(ValidationError::new("value", "must be a plain decimal number"));
    }
    let value = BigDecimal::from_str(&raw)
        .map_err(|_| ValidationError::new("value", "must be a decimal number"))?;
    validate_value(&value)?;

    Ok(value)
}
