//! BoundedDispatcher - admission-limited fan-out of query blobs
//!
//! Every input owns one slot, indexed by its input order. Admitted units run
//! inside a `JoinSet` owned by the `run` future and write back into their
//! slot when joined; dropping the future aborts whatever is still running.
//! Slots left empty belong to positions never admitted because the run was
//! cancelled. Units only share the admission semaphore and the run counters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use contracts::{ErrorDetail, QueryBlob, QueryOutcome, RemoteCaller, RunSummary};

use crate::error::DispatchError;
use crate::metrics::RunCounters;

const PROGRESS_EVERY: u64 = 100;

/// Runs one remote call per query with at most `limit` in flight
#[derive(Debug, Clone)]
pub struct BoundedDispatcher {
    limit: usize,
    cancel: CancellationToken,
}

impl BoundedDispatcher {
    /// Create a dispatcher with a fresh, never-cancelled token
    ///
    /// # Errors
    /// `limit` below one
    pub fn new(limit: usize) -> Result<Self, DispatchError> {
        if limit < 1 {
            return Err(DispatchError::InvalidLimit(limit));
        }
        Ok(Self {
            limit,
            cancel: CancellationToken::new(),
        })
    }

    /// Observe an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Token this dispatcher observes; cancelling it stops the current run
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Execute every query and collect outcomes in input order
    ///
    /// Returns once every admitted unit has finished. Per-query failures,
    /// panics and cancellation all end up as `Outcome::Failure` in the
    /// summary; the run itself never fails after it started. Dropping the
    /// returned future aborts the units still in flight.
    ///
    /// # Errors
    /// The token is already cancelled on entry.
    #[instrument(
        name = "dispatcher_run",
        skip(self, queries, caller),
        fields(limit = self.limit, total = queries.len(), caller = caller.name())
    )]
    pub async fn run<C>(
        &self,
        queries: Vec<QueryBlob>,
        caller: Arc<C>,
    ) -> Result<RunSummary, DispatchError>
    where
        C: RemoteCaller + Sync + 'static,
    {
        if self.cancel.is_cancelled() {
            return Err(DispatchError::AlreadyCancelled);
        }
        if queries.is_empty() {
            debug!("Empty input, nothing to dispatch");
            return Ok(RunSummary::empty());
        }

        let started = Instant::now();
        let total = queries.len() as u64;
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let counters = Arc::new(RunCounters::new());

        let positions: Vec<usize> = queries.iter().map(QueryBlob::position).collect();
        let mut slots: Vec<Option<QueryOutcome>> = positions.iter().map(|_| None).collect();
        let mut units = JoinSet::new();
        let mut slot_of = HashMap::with_capacity(positions.len());

        info!("Dispatch started");

        for (index, blob) in queries.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                break;
            };

            let unit = units.spawn(run_unit(
                blob,
                Arc::clone(&caller),
                Arc::clone(&counters),
                self.cancel.clone(),
                permit,
                total,
            ));
            slot_of.insert(unit.id(), index);
        }

        while let Some(joined) = units.join_next_with_id().await {
            let (id, joined) = match joined {
                Ok((id, outcome)) => (id, Ok(outcome)),
                Err(e) => (e.id(), Err(e)),
            };
            let Some(&index) = slot_of.get(&id) else {
                continue;
            };
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    let position = positions[index];
                    let message = join_error_message(e);
                    warn!(position, error = %message, "Unit of work aborted");
                    counters.inc_failure();
                    let outcome =
                        QueryOutcome::not_run(position, ErrorDetail::Aborted { message });
                    observability::record_query_outcome(&outcome);
                    outcome
                }
            };
            slots[index] = Some(outcome);
        }

        let outcomes: Vec<QueryOutcome> = slots
            .into_iter()
            .zip(positions)
            .map(|(slot, position)| {
                slot.unwrap_or_else(|| {
                    counters.inc_failure();
                    let outcome = QueryOutcome::not_run(position, ErrorDetail::Cancelled);
                    observability::record_query_outcome(&outcome);
                    outcome
                })
            })
            .collect();

        let snapshot = counters.snapshot();
        let summary = RunSummary::new(
            snapshot.success_count,
            snapshot.failure_count,
            outcomes,
            started.elapsed(),
        );

        info!(
            success = summary.success_count(),
            failure = summary.failure_count(),
            peak_in_flight = snapshot.peak_in_flight,
            cancelled = self.cancel.is_cancelled(),
            elapsed_ms = summary.elapsed().as_millis() as u64,
            "Dispatch finished"
        );

        Ok(summary)
    }
}

async fn run_unit<C>(
    blob: QueryBlob,
    caller: Arc<C>,
    counters: Arc<RunCounters>,
    cancel: CancellationToken,
    permit: OwnedSemaphorePermit,
    total: u64,
) -> QueryOutcome
where
    C: RemoteCaller + Sync,
{
    // Released when the unit finishes, unwinds or is aborted.
    let _permit = permit;
    let position = blob.position();

    let started = Instant::now();
    let result = {
        let guard = counters.enter();
        trace!(position, in_flight = guard.entered_at(), "Unit started");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ErrorDetail::Cancelled),
            result = caller.call(&blob) => result,
        }
    };
    let latency = started.elapsed();

    let completed = match &result {
        Ok(_) => counters.inc_success(),
        Err(e) => {
            warn!(position, kind = e.kind(), error = %e, "Query failed");
            counters.inc_failure()
        }
    };
    if completed.is_multiple_of(PROGRESS_EVERY) {
        debug!(completed, total, "Dispatch progress");
    }

    let outcome = QueryOutcome {
        position,
        outcome: result.into(),
        latency,
    };
    observability::record_query_outcome(&outcome);
    outcome
}

fn join_error_message(e: JoinError) -> String {
    if !e.is_panic() {
        return e.to_string();
    }
    let payload = e.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unit of work panicked".to_string()
    }
}
