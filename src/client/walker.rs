//! Remote pagination walker: follows `page_key` until the endpoint runs dry.

use super::{error_message, query_pairs, VmClient};
use crate::error::ApiError;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Query flag telling the server the caller understands cursor pagination.
pub const CURSOR_PAGINATION_FLAG: &str = "user_cursor_pagination";

#[derive(Debug, Deserialize)]
struct RemotePage {
    result: Vec<Value>,
    pagination: RemotePagination,
}

#[derive(Debug, Deserialize)]
struct RemotePagination {
    #[serde(default)]
    page_key: Option<String>,
    has_more: bool,
}

impl VmClient {
    /// Fetch every page of a paginated endpoint, in order.
    ///
    /// Stops when a page reports `has_more: false` or once at least `cap` results
    /// were collected. Pages are appended whole, so the result can overshoot `cap`.
    /// Any failed page fails the whole walk; nothing partial is returned.
    pub async fn fetch_all(
        &self,
        path: &str,
        params: &Map<String, Value>,
        cap: Option<usize>,
    ) -> Result<Vec<Value>, ApiError> {
        let mut query = query_pairs(params);
        query.retain(|(name, _)| name != CURSOR_PAGINATION_FLAG);
        query.push((CURSOR_PAGINATION_FLAG.to_string(), "true".to_string()));

        let mut results = Vec::new();
        let mut pages = 0usize;

        loop {
            let body = self.request(path, &query).await?;
            if let Some(error) = body.get("error") {
                return Err(ApiError::Remote(error_message(error)));
            }
            let page: RemotePage = serde_json::from_value(body)
                .map_err(|e| ApiError::MalformedResponse(format!("{}: {}", path, e)))?;

            pages += 1;
            results.extend(page.result);
            debug!(
                path,
                pages,
                collected = results.len(),
                has_more = page.pagination.has_more,
                "Fetched page"
            );

            if !page.pagination.has_more {
                break;
            }
            if cap.is_some_and(|cap| results.len() >= cap) {
                debug!(path, cap = ?cap, "Result cap reached");
                break;
            }
            let Some(page_key) = page.pagination.page_key else {
                warn!(path, pages, "Endpoint reported more results without a page_key; stopping");
                break;
            };

            query.retain(|(name, _)| name != "page_key");
            query.push(("page_key".to_string(), page_key));
        }

        Ok(results)
    }
}
