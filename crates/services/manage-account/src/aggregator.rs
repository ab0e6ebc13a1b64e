//! Concurrent user-detail aggregation.
//!
//! Resolves a batch of user ids into profile records with one profile call per
//! id, at most `max_concurrency` in flight, so total latency tracks the slowest
//! call rather than the sum. Individual failures are kept next to the id they
//! belong to and never fail the batch.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use domain::UserDetail;

use crate::clients::{FetchError, ProfileClient};

/// Result of resolving one requested id.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Identifier as requested
    pub id: String,
    pub result: Result<UserDetail, FetchError>,
}

/// Per-id failure as reported to clients.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct FetchFailure {
    pub id: String,
    pub error: String,
}

/// All outcomes of one aggregation, in completion order.
///
/// Holds exactly one entry per requested id, duplicates included.
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    outcomes: Vec<FetchOutcome>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[FetchOutcome] {
        &self.outcomes
    }

    /// Number of ids whose lookup failed.
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Failed ids with their error.
    pub fn failures(&self) -> Vec<FetchFailure> {
        self.outcomes
            .iter()
            .filter_map(|o| {
                o.result.as_ref().err().map(|e| FetchFailure {
                    id: o.id.clone(),
                    error: e.to_string(),
                })
            })
            .collect()
    }

    /// Records with failed lookups replaced by the zero-value record.
    pub fn into_records(self) -> Vec<UserDetail> {
        self.outcomes
            .into_iter()
            .map(|o| o.result.unwrap_or_default())
            .collect()
    }
}

/// Fans profile lookups out over a shared [`ProfileClient`].
pub struct DetailAggregator {
    client: Arc<dyn ProfileClient>,
    max_concurrency: usize,
}

impl DetailAggregator {
    /// `max_concurrency` is clamped to at least one.
    pub fn new(client: Arc<dyn ProfileClient>, max_concurrency: usize) -> Self {
        Self {
            client,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Look up every id and wait for all lookups to finish.
    ///
    /// Each lookup carries `correlation_id`. Never fails. Ids still pending when `cancel` fires are abandoned (their
    /// HTTP request is dropped) and reported as [`FetchError::Cancelled`].
    pub async fn aggregate(
        &self,
        ids: &[String],
        correlation_id: &str,
        cancel: &CancellationToken,
    ) -> AggregationResult {
        if ids.is_empty() {
            return AggregationResult::default();
        }

        let lookups = ids.iter().cloned().map(|id| {
            let client = Arc::clone(&self.client);
            let cancel = cancel.clone();
            async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(FetchError::Cancelled),
                    result = client.fetch_one(&id, correlation_id) => result,
                };
                if let Err(e) = &result {
                    debug!(request_id = %correlation_id, id = %id, error = %e, "Profile lookup failed");
                }
                FetchOutcome { id, result }
            }
        });

        let outcomes: Vec<FetchOutcome> = stream::iter(lookups)
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let result = AggregationResult { outcomes };
        let failed = result.failure_count();
        if failed > 0 {
            warn!(request_id = %correlation_id, requested = ids.len(), failed, "Aggregation completed with failures");
        } else {
            debug!(request_id = %correlation_id, requested = ids.len(), "Aggregation completed");
        }
        result
    }
}
