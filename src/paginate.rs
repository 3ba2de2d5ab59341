//! Keyset Paginator
//!
//! Returns one bounded page of a collection under a registered ordering scope,
//! resuming after the record named by an opaque page key. Pages are stateless:
//! everything needed to continue is in the returned `page_key`.

use crate::numeric::canonicalize_serialize;
use crate::order::{OrderRegistry, Orderable, PageKey};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Ordering;
use tracing::debug;

/// Page size bounds applied to caller-requested `max_results`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPolicy {
    /// Page size when the caller does not ask for one
    pub default_max_results: usize,
    /// Upper bound for callers that are not authorized
    pub results_limit: usize,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            default_max_results: 25,
            results_limit: 50,
        }
    }
}

impl LimitPolicy {
    /// Page size for a request.
    ///
    /// Unauthorized callers are always clamped to `[1, results_limit]`. An
    /// authorized caller's explicit `max_results` is honored as-is (at least 1).
    pub fn effective_limit(&self, requested: Option<i64>, authorized: bool) -> usize {
        match requested {
            Some(requested) if authorized => {
                usize::try_from(requested.max(1)).unwrap_or(usize::MAX)
            }
            _ => {
                let upper = self.results_limit.max(1);
                let wanted = match requested {
                    Some(requested) => usize::try_from(requested.max(1)).unwrap_or(usize::MAX),
                    None => self.default_max_results,
                };
                wanted.clamp(1, upper)
            }
        }
    }
}

/// Pagination parameters of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub sort_by: Option<String>,
    pub reverse: bool,
    pub page_key: Option<String>,
    pub max_results: Option<i64>,
}

impl PageRequest {
    /// Extract pagination parameters from raw query pairs; the last occurrence wins.
    ///
    /// Blank values count as absent, `reverse` is false only when absent, blank,
    /// `false` or `0`, and a non-integer `max_results` is ignored.
    pub fn from_query(pairs: &[(String, String)]) -> Self {
        let mut request = PageRequest::default();
        for (name, value) in pairs {
            let value = value.trim();
            match name.as_str() {
                "sort_by" => request.sort_by = non_blank(value),
                "page_key" => request.page_key = non_blank(value),
                "reverse" => {
                    request.reverse = !(value.is_empty()
                        || value.eq_ignore_ascii_case("false")
                        || value == "0")
                }
                "max_results" => request.max_results = value.parse().ok(),
                _ => {}
            }
        }
        request
    }

    /// The request as query pairs, the inverse of [`PageRequest::from_query`].
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sort_by".to_string(), sort_by.clone()));
        }
        if self.reverse {
            pairs.push(("reverse".to_string(), "true".to_string()));
        }
        if let Some(page_key) = &self.page_key {
            pairs.push(("page_key".to_string(), page_key.clone()));
        }
        if let Some(max_results) = self.max_results {
            pairs.push(("max_results".to_string(), max_results.to_string()));
        }
        pairs
    }

    pub fn sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn after(mut self, page_key: Option<&PageKey>) -> Self {
        self.page_key = page_key.map(|key| key.as_str().to_string());
        self
    }

    pub fn max_results(mut self, max_results: i64) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Continuation metadata of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page_key: Option<PageKey>,
    pub has_more: bool,
}

/// One page of records plus continuation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub records: Vec<E>,
    pub pagination: PaginationMeta,
}

impl<E: Serialize> Page<E> {
    /// `{ "result": [...], "pagination": { "page_key", "has_more" } }` with
    /// numeric leaves of `result` rendered as canonical strings.
    pub fn to_response(&self) -> Result<Value, serde_json::Error> {
        Ok(json!({
            "result": canonicalize_serialize(&self.records)?,
            "pagination": serde_json::to_value(&self.pagination)?,
        }))
    }
}

/// Result of [`Paginator::paginate`]: the page and the scope name it was ordered by.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome<E> {
    pub page: Page<E>,
    pub sort_by: String,
}

/// Keyset paginator over one entity type.
#[derive(Debug)]
pub struct Paginator<'r, E: Orderable> {
    registry: &'r OrderRegistry<E>,
    limits: LimitPolicy,
}

impl<'r, E: Orderable> Paginator<'r, E> {
    pub fn new(registry: &'r OrderRegistry<E>, limits: LimitPolicy) -> Self {
        Self { registry, limits }
    }

    /// Return the page of `records` described by `request`.
    ///
    /// An unregistered `sort_by` falls back to the registry default. A page key
    /// that does not decode, or that names a record not in `records`, is treated
    /// as no page key at all: pagination restarts from the beginning of the
    /// collection instead of reporting an expired cursor. Clients polling for new
    /// rows with an old key will therefore see the first page again.
    pub fn paginate<'a, I>(&self, records: I, request: &PageRequest, authorized: bool) -> PageOutcome<E>
    where
        I: IntoIterator<Item = &'a E>,
        E: Clone + 'a,
    {
        let scope = self
            .registry
            .resolve(request.sort_by.as_deref(), request.reverse);
        let limit = self.limits.effective_limit(request.max_results, authorized);
        let attributes = self.registry.page_key_attributes();

        let records: Vec<&E> = records.into_iter().collect();
        let start = PageKey::decode(request.page_key.as_deref(), attributes).and_then(|values| {
            records
                .iter()
                .copied()
                .find(|record| PageKey::matches(*record, &values))
        });
        if start.is_none() && request.page_key.is_some() {
            debug!(
                page_key = request.page_key.as_deref().unwrap_or_default(),
                "Page key matches no record; starting from the beginning"
            );
        }

        let mut candidates: Vec<&E> = match start {
            Some(start) => records
                .into_iter()
                .filter(|record| scope.compare(*record, start) == Ordering::Greater)
                .collect(),
            None => records,
        };

        // One extra record tells us whether another page exists.
        let fetch = limit.saturating_add(1);
        if candidates.len() > fetch {
            candidates.select_nth_unstable_by(fetch - 1, |a, b| scope.compare(*a, *b));
            candidates.truncate(fetch);
        }
        candidates.sort_by(|a, b| scope.compare(*a, *b));

        let has_more = candidates.len() > limit;
        candidates.truncate(limit);

        let page: Vec<E> = candidates.into_iter().cloned().collect();
        let page_key = page.last().map(|record| PageKey::encode(record, attributes));

        debug!(
            sort_by = %scope.name,
            limit,
            returned = page.len(),
            has_more,
            "Paginated collection"
        );

        PageOutcome {
            page: Page {
                records: page,
                pagination: PaginationMeta { page_key, has_more },
            },
            sort_by: scope.name,
        }
    }
}
