//! Raw numeric input values as entered by the user.
//!
//! # Responsibility
//! - Keep credits/grade/manual inputs in the exact shape they were entered
//!   (JSON number or free text) so persisted data round-trips unchanged.
//! - Provide leading-number parsing used by the GPA engine.
//!
//! # Invariants
//! - Parsing never fails loudly: malformed input is reported as `None`.
//! - Non-finite numbers are never reported as parsable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

static LEADING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number regex")
});
static LEADING_INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("valid integer regex"));

/// One user-entered scalar: a number, or text that may or may not parse.
///
/// The empty text value is the "unset" state used while a field is being
/// edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    /// Returns the unset value (empty text).
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Coerces raw integer-field input the way the entry form does.
    ///
    /// The leading integer is kept; zero, missing or unparsable input
    /// becomes the unset value.
    pub fn from_integer_input(raw: &str) -> Self {
        match parse_leading_integer(raw) {
            Some(value) if value != 0 => Self::Number(value as f64),
            _ => Self::empty(),
        }
    }

    /// Returns whether the value carries no usable content.
    ///
    /// Mirrors form-level falsiness: empty text, zero and NaN are unset;
    /// whitespace text is not.
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Number(value) => *value == 0.0 || value.is_nan(),
            Self::Text(text) => text.is_empty(),
        }
    }

    /// Parses the value as a finite number using leading-number rules.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Number(_) => None,
            Self::Text(text) => parse_leading_number(text),
        }
    }
}

impl Default for InputValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for InputValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for InputValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Display for InputValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for InputValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        // Older snapshots may carry `null` for fields never touched.
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Number(value)) => Self::Number(value),
            Some(Raw::Text(text)) => Self::Text(text),
            None => Self::empty(),
        })
    }
}

/// Parses the longest numeric prefix of `raw` after leading whitespace.
///
/// `"3.5abc"` parses as `3.5`; `"abc"` and `""` are `None`.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let found = LEADING_NUMBER_RE.find(raw.trim_start())?;
    found
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses the leading base-10 integer of `raw` after leading whitespace.
pub fn parse_leading_integer(raw: &str) -> Option<i64> {
    let found = LEADING_INTEGER_RE.find(raw.trim_start())?;
    found.as_str().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_leading_integer, parse_leading_number, InputValue};

    #[test]
    fn leading_number_accepts_prefixes_and_rejects_garbage() {
        assert_eq!(parse_leading_number("3.5abc"), Some(3.5));
        assert_eq!(parse_leading_number("  18 "), Some(18.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("1e2"), Some(100.0));
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("-"), None);
    }

    #[test]
    fn integer_input_coercion_drops_zero_and_garbage() {
        assert_eq!(InputValue::from_integer_input("4"), InputValue::Number(4.0));
        assert_eq!(InputValue::from_integer_input("4.7"), InputValue::Number(4.0));
        assert_eq!(InputValue::from_integer_input("0"), InputValue::empty());
        assert_eq!(InputValue::from_integer_input("x"), InputValue::empty());
        assert_eq!(parse_leading_integer("-3"), Some(-3));
    }

    #[test]
    fn unset_follows_form_falsiness() {
        assert!(InputValue::empty().is_unset());
        assert!(InputValue::Number(0.0).is_unset());
        assert!(!InputValue::from(" ").is_unset());
        assert!(!InputValue::from("0").is_unset());
    }

    #[test]
    fn deserializes_numbers_text_and_null() {
        let values: Vec<InputValue> =
            serde_json::from_str(r#"[4, "3", null, ""]"#).expect("values should decode");
        assert_eq!(
            values,
            vec![
                InputValue::Number(4.0),
                InputValue::from("3"),
                InputValue::empty(),
                InputValue::empty(),
            ]
        );
    }

    #[test]
    fn display_renders_integral_numbers_without_fraction() {
        assert_eq!(InputValue::Number(4.0).to_string(), "4");
        assert_eq!(InputValue::Number(2.5).to_string(), "2.5");
        assert_eq!(InputValue::from("3.50").to_string(), "3.50");
    }
}
