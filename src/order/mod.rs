//! Ordering scopes for keyset pagination.
//!
//! An entity type declares a closed set of sortable attributes and the subset of
//! them that uniquely identifies a record (its page key attributes). Ordering
//! scopes are named lists of `(attribute, direction)` terms registered once at
//! startup in an [`OrderRegistry`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub mod key;
pub mod registry;

pub use key::{PageKey, PAGE_KEY_DELIMITER};
pub use registry::{OrderRegistry, OrderRegistryBuilder, ResolvedScope};

/// Suffix marking the reverse traversal of a registered scope.
pub const REVERSE_SUFFIX: &str = "_reverse";

/// Sort direction of a single order term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// Value of a sortable attribute. Integers are unsigned: every numeric
/// attribute in this crate is a height, index or amount.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortValue {
    Int(u128),
    Text(String),
}

impl fmt::Display for SortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortValue::Int(value) => write!(f, "{}", value),
            SortValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<u64> for SortValue {
    fn from(value: u64) -> Self {
        SortValue::Int(u128::from(value))
    }
}

impl From<u32> for SortValue {
    fn from(value: u32) -> Self {
        SortValue::Int(u128::from(value))
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

/// A sortable attribute of an entity type.
pub trait Attribute: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Wire name of the attribute
    fn name(&self) -> &'static str;
}

/// A record type that can be paginated.
pub trait Orderable {
    type Attribute: Attribute;

    /// Current value of `attribute` on this record.
    fn sort_value(&self, attribute: Self::Attribute) -> SortValue;
}

/// One `(attribute, direction)` term of an ordering scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm<A> {
    pub attribute: A,
    pub direction: Direction,
}

/// Comparator of an ordering scope: terms applied left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec<A> {
    terms: Vec<OrderTerm<A>>,
}

impl<A: Attribute> OrderSpec<A> {
    pub fn new(terms: impl IntoIterator<Item = (A, Direction)>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|(attribute, direction)| OrderTerm {
                    attribute,
                    direction,
                })
                .collect(),
        }
    }

    pub fn terms(&self) -> &[OrderTerm<A>] {
        &self.terms
    }

    /// Same terms with every direction inverted.
    pub fn reversed(&self) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|term| OrderTerm {
                    attribute: term.attribute,
                    direction: term.direction.reversed(),
                })
                .collect(),
        }
    }

    pub fn orders_by(&self, attribute: A) -> bool {
        self.terms.iter().any(|term| term.attribute == attribute)
    }

    /// Compare two records under this spec.
    pub fn compare<E>(&self, a: &E, b: &E) -> Ordering
    where
        E: Orderable<Attribute = A>,
    {
        for term in &self.terms {
            let ordering = term
                .direction
                .apply(a.sort_value(term.attribute).cmp(&b.sort_value(term.attribute)));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
