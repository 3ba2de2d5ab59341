//! Numeric Canonicalization
//!
//! Converts every numeric leaf of a JSON document into its exact decimal string so
//! that 256-bit integers and long decimals survive clients that parse JSON numbers
//! as doubles. Applied to response bodies and to outbound request arguments.
//!
//! `serde_json` is built with `arbitrary_precision`, so a `Number` still carries the
//! literal it was parsed from and nothing is rounded before we see it.

use serde::Serialize;
use serde_json::Value;

/// Largest exponent magnitude that is expanded into plain digits.
const MAX_EXPONENT: i64 = 4096;

/// Canonicalize every numeric leaf of `value`, returning a new document.
///
/// Numbers become strings, numeric-looking strings are normalized the same way,
/// and everything else (including object key order) is left as it was.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Number(number) => {
            let literal = number.to_string();
            Value::String(canonical_decimal(&literal).unwrap_or(literal))
        }
        Value::String(text) => Value::String(canonicalize_str(text)),
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), canonicalize(item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Serialize `value` and canonicalize the result.
pub fn canonicalize_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value).map(|v| canonicalize(&v))
}

/// Normalize a string if it is a decimal literal, otherwise return it unchanged.
pub fn canonicalize_str(text: &str) -> String {
    canonical_decimal(text).unwrap_or_else(|| text.to_string())
}

/// Canonical form of a JSON-grammar decimal literal, or `None` if `text` is not one.
pub fn canonical_decimal(text: &str) -> Option<String> {
    DecimalLiteral::parse(text).map(|d| d.render())
}

/// A parsed decimal: `(-1)^negative * digits * 10^-scale`.
#[derive(Debug, PartialEq, Eq)]
struct DecimalLiteral {
    negative: bool,
    digits: String,
    scale: i64,
}

impl DecimalLiteral {
    /// Parse `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
    fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut pos = 0;

        let negative = bytes.first() == Some(&b'-');
        if negative {
            pos += 1;
        }

        let int_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let int_part = &text[int_start..pos];
        if int_part.is_empty() || (int_part.len() > 1 && int_part.starts_with('0')) {
            return None;
        }

        let mut frac_part = "";
        if pos < bytes.len() && bytes[pos] == b'.' {
            pos += 1;
            let frac_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            frac_part = &text[frac_start..pos];
            if frac_part.is_empty() {
                return None;
            }
        }

        let mut exponent: i64 = 0;
        if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
            pos += 1;
            let exp_negative = match bytes.get(pos) {
                Some(b'-') => {
                    pos += 1;
                    true
                }
                Some(b'+') => {
                    pos += 1;
                    false
                }
                _ => false,
            };
            let exp_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            let exp_digits = text[exp_start..pos].trim_start_matches('0');
            if pos == exp_start || exp_digits.len() > 5 {
                return None;
            }
            let magnitude: i64 = if exp_digits.is_empty() {
                0
            } else {
                exp_digits.parse().ok()?
            };
            if magnitude > MAX_EXPONENT {
                return None;
            }
            exponent = if exp_negative { -magnitude } else { magnitude };
        }

        if pos != bytes.len() {
            return None;
        }

        let digits = format!("{int_part}{frac_part}");
        let mut literal = Self {
            negative,
            digits,
            scale: frac_part.len() as i64 - exponent,
        };
        literal.normalize();
        Some(literal)
    }

    fn normalize(&mut self) {
        let trimmed = self.digits.trim_start_matches('0');
        self.digits = trimmed.to_string();

        if self.digits.is_empty() {
            self.negative = false;
            self.scale = 0;
            return;
        }

        while self.scale > 0 && self.digits.ends_with('0') {
            self.digits.pop();
            self.scale -= 1;
        }
        if self.scale < 0 {
            self.digits
                .extend(std::iter::repeat('0').take((-self.scale) as usize));
            self.scale = 0;
        }
    }

    fn render(&self) -> String {
        if self.digits.is_empty() {
            return "0".to_string();
        }

        let sign = if self.negative { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            format!("{sign}{}", self.digits)
        } else if self.digits.len() > scale {
            let (int, frac) = self.digits.split_at(self.digits.len() - scale);
            format!("{sign}{int}.{frac}")
        } else {
            let zeros = "0".repeat(scale - self.digits.len());
            format!("{sign}0.{zeros}{}", self.digits)
        }
    }
}
