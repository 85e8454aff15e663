//! ResultSink trait - persistence of a finished run
//!
//! Sinks see the run only after the dispatcher has joined every unit of work.

use crate::{ContractError, RunSummary};

/// Result output trait
#[trait_variant::make(ResultSink: Send)]
pub trait LocalResultSink {
    /// Sink name (used for logging)
    fn name(&self) -> &str;

    /// Persist a completed run
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, summary: &RunSummary) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
