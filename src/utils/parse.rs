use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Rejected command-line input, raised before any request is sent.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Invalid JSON input: {reason}\n  Input: {hint}")]
    InvalidJson { reason: String, hint: String },
    #[error("{flag} must be a JSON {expected}")]
    WrongJsonShape {
        flag: &'static str,
        expected: &'static str,
    },
    #[error("Invalid boolean value: \"{0}\". Use true or false.")]
    InvalidBool(String),
    #[error("Invalid discount value: \"{0}\". Must be a number >= 0 (e.g. 10, 10.5, 0.25).")]
    InvalidDiscount(String),
    #[error("{0} is required (or use --data for a raw body)")]
    MissingFlag(&'static str),
    #[error("At least one field must be provided when not using --data")]
    EmptyUpdate,
    #[error("{0}")]
    Conflict(String),
    #[error("Webhook signature is invalid")]
    InvalidSignature,
}

/// Longest slice of the offending input echoed back in a JSON error.
const HINT_LEN: usize = 80;

pub fn parse_json(input: &str) -> Result<Value, InputError> {
    serde_json::from_str(input).map_err(|e| {
        let hint = if input.chars().count() > HINT_LEN {
            format!("{}…", input.chars().take(HINT_LEN).collect::<String>())
        } else {
            input.to_string()
        };
        InputError::InvalidJson {
            reason: e.to_string(),
            hint,
        }
    })
}

/// Parse a flag that must hold a JSON array.
pub fn parse_json_array(flag: &'static str, input: &str) -> Result<Value, InputError> {
    match parse_json(input)? {
        value @ Value::Array(_) => Ok(value),
        _ => Err(InputError::WrongJsonShape {
            flag,
            expected: "array",
        }),
    }
}

/// Parse a flag that must hold a JSON object.
pub fn parse_json_object(flag: &'static str, input: &str) -> Result<Value, InputError> {
    match parse_json(input)? {
        value @ Value::Object(_) => Ok(value),
        _ => Err(InputError::WrongJsonShape {
            flag,
            expected: "object",
        }),
    }
}

/// `true`/`1` and `false`/`0`.
pub fn parse_bool(input: &str) -> Result<bool, InputError> {
    match input {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(InputError::InvalidBool(other.to_string())),
    }
}

/// A non-negative decimal. Values written with an explicit sign are passed
/// through as strings for the API to interpret.
pub fn parse_discount_value(input: &str) -> Result<Value, InputError> {
    let invalid = || InputError::InvalidDiscount(input.to_string());

    let unsigned = input.strip_prefix(['+', '-']).unwrap_or(input);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !digits_only(whole) || !digits_only(fraction) {
        return Err(invalid());
    }

    if unsigned.len() != input.len() {
        return Ok(Value::String(input.to_string()));
    }

    let number: f64 = input.parse().map_err(|_| invalid())?;
    json_number(number).ok_or_else(invalid)
}

/// Integral values become JSON integers, everything else a float.
pub fn json_number(value: f64) -> Option<Value> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Some(Value::Number(Number::from(value as i64)));
    }
    Number::from_f64(value).map(Value::Number)
}

/// Split `a, b,,c` into `["a", "b", "c"]`.
pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A JSON request body assembled from optional flags.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Set `key` only when `value` is present.
    pub fn set_opt<T: Into<Value>>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), value.into());
        }
        self
    }

    /// Set `key` to `true` when `flag` is set.
    pub fn set_flag(&mut self, key: &str, flag: bool) -> &mut Self {
        if flag {
            self.0.insert(key.to_string(), Value::Bool(true));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_json_echoes_truncated_input() {
        let long = format!("{{{}", "x".repeat(200));
        let InputError::InvalidJson { hint, .. } = parse_json(&long).unwrap_err() else {
            panic!("expected InvalidJson");
        };
        assert_eq!(hint.chars().count(), HINT_LEN + 1);
        assert!(hint.ends_with('…'));
    }

    #[test]
    fn json_shape_is_checked() {
        assert!(parse_json_array("--items", "[]").is_ok());
        assert_eq!(
            parse_json_array("--items", "{}").unwrap_err(),
            InputError::WrongJsonShape {
                flag: "--items",
                expected: "array"
            }
        );
        assert!(parse_json_object("--payment-methods", r#"{"visa":true}"#).is_ok());
    }

    #[test]
    fn booleans() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert!(parse_bool("yes").is_err());
    }

    #[test]
    fn discount_values() {
        assert_eq!(parse_discount_value("10").unwrap(), json!(10));
        assert_eq!(parse_discount_value("10.5").unwrap(), json!(10.5));
        assert_eq!(parse_discount_value(".25").unwrap(), json!(0.25));
        assert_eq!(parse_discount_value("007").unwrap(), json!(7));
        assert_eq!(parse_discount_value("+5").unwrap(), json!("+5"));
        assert_eq!(parse_discount_value("-5").unwrap(), json!("-5"));
        for bad in ["", ".", "+", "-.", "abc", "1.2.3", "1e5"] {
            assert!(parse_discount_value(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn csv_is_trimmed_and_compacted() {
        assert_eq!(split_csv(" a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn body_skips_absent_values() {
        let mut body = Body::new();
        body.set("name", "Sara")
            .set_opt("email", None::<String>)
            .set_opt("alias", Some("s"))
            .set_flag("is_one_time", false)
            .set_flag("is_price_inclusive_of_vat", true);
        assert_eq!(
            body.into_value(),
            json!({"name": "Sara", "alias": "s", "is_price_inclusive_of_vat": true})
        );
    }
}
