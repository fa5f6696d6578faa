/**
 * Parameter values and their validators.
 *
 * Callers hand parameters in as `serde_json::Value` so that one entry point
 * can take strings, numbers and booleans alike. Each `Kind` has one generic
 * validator that either coerces the input into a `ParamValue` or explains
 * why it was rejected; `validate` layers the field's `Rule` on top.
 *
 * Validators return `Err(String)` with a human-readable reason. The caller
 * attaches the parameter key and turns it into a `HitError`.
 */
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Number, Value};

use super::schema::{FieldSpec, HitType, Kind, Rule};

// ---------------------------------------------------------------------------
// ParamValue
// ---------------------------------------------------------------------------

/**
 * A validated parameter value. Every `ParamValue` that exists already
 * satisfies the rules of the field it is stored under.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),

    /// Rendered on the wire as `1` or `0`.
    Boolean(bool),

    Integer(i64),

    /// Decimal string with exactly two fraction digits, e.g. `"10.00"`.
    Currency(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) | ParamValue::Currency(s) => f.write_str(s),
            ParamValue::Boolean(b) => f.write_str(if *b { "1" } else { "0" }),
            ParamValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/**
 * Validates `value` against a schema field.
 *
 * Returns `Ok(None)` when the field's rule says the value should be skipped
 * without error (a negative queue time).
 */
pub fn validate(spec: &FieldSpec, value: &Value) -> Result<Option<ParamValue>, String> {
    match spec.rule {
        Rule::None => {}
        Rule::NonNegative => {
            if is_negative(value) {
                return Ok(None);
            }
        }
        Rule::HitType => {
            let name = value.as_str().unwrap_or_default();
            HitType::from_str(name)?;
        }
        Rule::SessionControl => {
            if !matches!(value.as_str(), Some("start" | "end")) {
                return Err("session control must be either `start` or `end`".into());
            }
        }
    }

    let stored = match spec.kind {
        Kind::Text => ParamValue::Text(text(value)?),
        Kind::Boolean => ParamValue::Boolean(boolean(value)?),
        Kind::Integer => ParamValue::Integer(integer(value)?),
        Kind::Currency => ParamValue::Currency(currency(value)?),
    };

    Ok(Some(stored))
}

// ---------------------------------------------------------------------------
// Generic validators
// ---------------------------------------------------------------------------

/// A string that is non-empty after trimming. Stored untrimmed.
pub fn text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err("argument must be a non-empty string".into()),
    }
}

/// A boolean, or the integers `1` / `0`.
pub fn boolean(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err("argument must be a boolean or integer 1 or 0".into()),
        },
        _ => Err("argument must be a boolean or integer 1 or 0".into()),
    }
}

/// An integer, or a float / numeric string holding an exact integer.
pub fn integer(value: &Value) -> Result<i64, String> {
    let parsed = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => number_to_decimal(n).and_then(decimal_to_i64),
        },
        Value::String(s) => parse_decimal(s).and_then(decimal_to_i64),
        _ => None,
    };

    parsed.ok_or_else(|| "argument must be an integer".into())
}

/// Any number or numeric string, formatted with two fraction digits.
pub fn currency(value: &Value) -> Result<String, String> {
    let formatted = match value {
        Value::Number(n) => number_to_decimal(n)
            .map(format_currency)
            .or_else(|| n.as_f64().and_then(format_wide_currency)),
        Value::String(s) => parse_decimal(s).map(format_currency).or_else(|| {
            numeric_str(s)
                .and_then(|t| t.parse::<f64>().ok())
                .and_then(format_wide_currency)
        }),
        _ => None,
    };

    formatted.ok_or_else(|| "currency must be a valid float or a numeric string".into())
}

/// Free text for custom dimensions/metrics. Scalars are stored in their
/// wire rendering; `null`, arrays and objects are rejected.
pub fn free_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.into()),
        _ => Err("custom dimension/metric value must be a string, number or boolean".into()),
    }
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/**
 * Parses a numeric string (`"5"`, `" -1.25 "`, `"1e3"`) into a `Decimal`.
 * Returns `None` for anything that is not a finite, in-range number.
 */
fn parse_decimal(s: &str) -> Option<Decimal> {
    let trimmed = numeric_str(s)?;
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Trims `s` and keeps it only if every char belongs to a plain decimal or
/// exponent literal. `Decimal::from_str` skips `_` and `f64` accepts `inf`.
fn numeric_str(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    let numeric = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E');
    (!trimmed.is_empty() && trimmed.chars().all(numeric)).then_some(trimmed)
}

/*
 * serde_json renders floats with the shortest representation that round-trips,
 * which is the decimal the caller wrote. Going through it makes 9.995 round to
 * 10.00 instead of truncating the binary 9.99499999... to 9.99.
 */
fn number_to_decimal(n: &Number) -> Option<Decimal> {
    parse_decimal(&n.to_string())
}

fn decimal_to_i64(d: Decimal) -> Option<i64> {
    if d.fract().is_zero() {
        d.trunc().to_i64()
    } else {
        None
    }
}

fn is_negative(value: &Value) -> bool {
    let number = match value {
        Value::Number(n) => number_to_decimal(n),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };

    number.is_some_and(|d| d.is_sign_negative() && !d.is_zero())
}

/// Rounds half away from zero to two places and pads to exactly two digits.
fn format_currency(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(2);
    rounded.to_string()
}

/// Amounts past `Decimal`'s range have no cents worth rounding exactly.
fn format_wide_currency(amount: f64) -> Option<String> {
    if !amount.is_finite() {
        return None;
    }
    let formatted = format!("{amount:.2}");
    Some(match formatted.as_str() {
        "-0.00" => "0.00".to_string(),
        _ => formatted,
    })
}
