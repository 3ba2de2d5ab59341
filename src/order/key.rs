//! Page key codec.
//!
//! A page key is the page key attribute values of a record joined with `-`. It
//! carries no scope identity, so the same key resumes any scope over the same
//! entity type. Text components are escaped so that a `-` (or `%`) inside a
//! value survives the round trip: `-` becomes `%2D` and `%` becomes `%25`.

use super::{Attribute, Orderable};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PAGE_KEY_DELIMITER: char = '-';

/// Opaque resumption cursor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(String);

impl PageKey {
    /// Encode the page key of `record` from `attributes`, in declared order.
    pub fn encode<E: Orderable>(record: &E, attributes: &[E::Attribute]) -> Self {
        let parts: Vec<String> = attributes
            .iter()
            .map(|attribute| escape_component(&record.sort_value(*attribute).to_string()))
            .collect();
        PageKey(parts.join(&PAGE_KEY_DELIMITER.to_string()))
    }

    /// Split `key` back onto `attributes`.
    ///
    /// Returns `None` for an absent or blank key, for a key whose component
    /// count differs from the attribute count, and for a malformed escape.
    /// Whether a record with these values exists is not checked here.
    pub fn decode<A: Attribute>(key: Option<&str>, attributes: &[A]) -> Option<Vec<(A, String)>> {
        let key = key?.trim();
        if key.is_empty() {
            return None;
        }

        let parts: Vec<&str> = key.split(PAGE_KEY_DELIMITER).collect();
        if parts.len() != attributes.len() {
            return None;
        }

        attributes
            .iter()
            .copied()
            .zip(parts)
            .map(|(attribute, part)| unescape_component(part).map(|value| (attribute, value)))
            .collect()
    }

    /// Whether `record` carries exactly the decoded key values.
    pub fn matches<E: Orderable>(record: &E, values: &[(E::Attribute, String)]) -> bool {
        values
            .iter()
            .all(|(attribute, value)| record.sort_value(*attribute).to_string() == *value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn escape_component(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            PAGE_KEY_DELIMITER => escaped.push_str("%2D"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn unescape_component(part: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(part.len());
    let mut rest = part.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'%' {
            let digits = tail.get(..2).filter(|d| d.iter().all(u8::is_ascii_hexdigit))?;
            bytes.push(u8::from_str_radix(std::str::from_utf8(digits).ok()?, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PageKey {
    fn from(value: String) -> Self {
        PageKey(value)
    }
}
