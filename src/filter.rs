//! Equality filters from repeated query parameters.

use tracing::debug;

/// Most values a single filter parameter may carry.
pub const DEFAULT_PARAM_LIMIT: usize = 100;

/// A record whose fields can be filtered by name.
pub trait Filterable {
    /// Value of the named field, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<String>;
}

/// Normalize, dedupe and bound the values of one parameter.
///
/// `0x`-prefixed hex strings of whole bytes are lowercased so that checksummed
/// addresses match their stored form. Order of first occurrence is kept.
pub fn parse_param_array<I, S>(values: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if out.len() == limit {
            break;
        }
        let value = normalize_value(value.as_ref());
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn normalize_value(value: &str) -> String {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"));
    match digits {
        Some(digits) if !digits.is_empty() && hex::decode(digits).is_ok() => value.to_ascii_lowercase(),
        _ => value.to_string(),
    }
}

/// Allowed values per field; a record passes when every field matches one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: Vec<(String, Vec<String>)>,
}

impl FilterSet {
    /// Build filters for `names` from query pairs. Both `name` and `name[]` are read;
    /// a parameter with no values imposes no filter.
    pub fn from_query(pairs: &[(String, String)], names: &[&str]) -> Self {
        let mut filters = Vec::new();
        for name in names {
            let array_name = format!("{}[]", name);
            let values = parse_param_array(
                pairs
                    .iter()
                    .filter(|(key, value)| {
                        (key.as_str() == *name || key.as_str() == array_name.as_str())
                            && !value.is_empty()
                    })
                    .map(|(_, value)| value.as_str()),
                DEFAULT_PARAM_LIMIT,
            );
            if !values.is_empty() {
                filters.push((name.to_string(), values));
            }
        }

        if !filters.is_empty() {
            debug!(filters = filters.len(), "Parsed query filters");
        }
        Self { filters }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.filters
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn matches<E: Filterable>(&self, record: &E) -> bool {
        self.filters.iter().all(|(field, allowed)| {
            record
                .field(field)
                .map(|value| allowed.contains(&normalize_value(&value)))
                .unwrap_or(false)
        })
    }

    /// Records that pass every filter, in their original order.
    pub fn apply<'a, E: Filterable>(&self, records: &'a [E]) -> Vec<&'a E> {
        records.iter().filter(|record| self.matches(*record)).collect()
    }
}
