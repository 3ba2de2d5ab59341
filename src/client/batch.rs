//! Concurrent batch dispatcher for contract static calls.

use super::{StaticCall, VmClient};
use crate::error::ApiError;
use futures::future::try_join_all;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

impl VmClient {
    /// Run every call concurrently and return the results in request order.
    ///
    /// The first failure to complete fails the batch: the remaining calls are
    /// dropped (cancelling their in-flight requests) and no partial results are
    /// returned. With `max_in_flight` configured, at most that many calls run at
    /// once.
    pub async fn batch_call(&self, calls: &[StaticCall]) -> Result<Vec<Value>, ApiError> {
        debug!(calls = calls.len(), max_in_flight = ?self.max_in_flight, "Dispatching static call batch");

        let results = match self.max_in_flight {
            Some(limit) => self.bounded_batch(calls, limit.max(1)).await,
            None => try_join_all(calls.iter().map(|call| self.static_call(call))).await,
        };

        if let Err(e) = &results {
            warn!(calls = calls.len(), error = %e, "Static call batch failed");
        }
        results
    }

    /// Completion-order dispatch with at most `limit` calls in flight. Results
    /// are slotted back by request index.
    async fn bounded_batch(&self, calls: &[StaticCall], limit: usize) -> Result<Vec<Value>, ApiError> {
        let mut slots: Vec<Option<Value>> = vec![None; calls.len()];
        let mut pending = stream::iter(calls.iter().enumerate())
            .map(|(index, call)| async move { self.static_call(call).await.map(|value| (index, value)) })
            .buffer_unordered(limit);

        while let Some(result) = pending.next().await {
            let (index, value) = result?;
            slots[index] = Some(value);
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| ApiError::MalformedResponse("Static call produced no result".to_string())))
            .collect()
    }
}
