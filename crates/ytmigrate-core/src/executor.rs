//! Per-item transfer loop over an ordered batch.
//!
//! The executor walks the batch in order, consults the ledger before
//! touching the remote system, classifies each mutation result, and
//! records durable progress. Control flow follows the classified
//! outcome: successes and duplicates are recorded and the loop moves
//! on, a rate-limit halts the remainder of the batch without recording
//! the triggering item, and any other failure leaves the item pending
//! and continues.

use tracing::{info, warn};

use crate::api::ApiResult;
use crate::classify::classify_mutation;
use crate::error::Result;
use crate::ledger::ProgressLedger;
use crate::model::{CollectionItem, TransferOutcome};

/// One item that failed and remains pending for a future run.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    /// Remote identifier of the item.
    pub id: String,
    /// Item title, for reporting.
    pub title: String,
    /// Raw remote message.
    pub message: String,
}

/// Tally of one executor pass over a batch.
#[derive(Debug, Clone, Default)]
pub struct ExecutorReport {
    /// Items in the batch.
    pub fetched: usize,
    /// Items applied this pass, duplicates included.
    pub applied: usize,
    /// Items skipped because the ledger already had them.
    pub skipped: usize,
    /// Items that failed and stay pending.
    pub failed: Vec<ItemFailure>,
    /// Whether the pass halted on a rate-limit.
    pub halted: bool,
    /// Raw remote message of the halting error, if any.
    pub halt_message: Option<String>,
}

impl ExecutorReport {
    /// One-line human summary of the pass.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} fetched, {} applied, {} skipped, {} failed",
            self.fetched,
            self.applied,
            self.skipped,
            self.failed.len()
        );
        if self.halted {
            line.push_str(" (halted: rate limit)");
        }
        line
    }
}

/// Runs batches of transfer items against an injected ledger.
#[derive(Debug)]
pub struct TransferExecutor<'a> {
    ledger: &'a mut ProgressLedger,
    processed: std::collections::HashSet<String>,
}

impl<'a> TransferExecutor<'a> {
    /// Create an executor over `ledger`, loading the processed set once.
    ///
    /// # Errors
    ///
    /// Fails if the ledger file exists but cannot be read.
    pub fn new(ledger: &'a mut ProgressLedger) -> Result<Self> {
        let processed = ledger.load()?;
        Ok(Self { ledger, processed })
    }

    /// Number of identifiers currently known to be processed.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Run one batch, applying `apply` to each not-yet-processed item.
    ///
    /// Already-recorded items are skipped without any remote call.
    /// Ledger entries are durably recorded before the loop advances
    /// past an applied or duplicate item; a rate-limited item is NOT
    /// recorded, so a resumed run retries it first.
    ///
    /// # Errors
    ///
    /// Fails only on ledger write errors. Remote failures are folded
    /// into the report, never propagated.
    pub fn run<F>(&mut self, items: &[CollectionItem], mut apply: F) -> Result<ExecutorReport>
    where
        F: FnMut(&CollectionItem) -> ApiResult<()>,
    {
        let mut report = ExecutorReport {
            fetched: items.len(),
            ..ExecutorReport::default()
        };

        for item in items {
            let key = item.ledger_key();
            if self.processed.contains(&key) {
                report.skipped += 1;
                continue;
            }

            match classify_mutation(apply(item)) {
                TransferOutcome::Applied => {
                    self.ledger.record(&key)?;
                    self.processed.insert(key);
                    report.applied += 1;
                    info!(id = %item.id, title = %item.title, "transferred item");
                }
                TransferOutcome::AlreadyExists { message } => {
                    // Already present on the destination counts as done.
                    self.ledger.record(&key)?;
                    self.processed.insert(key);
                    report.applied += 1;
                    info!(id = %item.id, message, "item already present, recorded");
                }
                TransferOutcome::RateLimited { message } => {
                    warn!(id = %item.id, message, "rate limit reached, halting batch");
                    report.halted = true;
                    report.halt_message = Some(message);
                    break;
                }
                TransferOutcome::Failed { message } => {
                    warn!(id = %item.id, title = %item.title, message, "item failed, continuing");
                    report.failed.push(ItemFailure {
                        id: item.id.clone(),
                        title: item.title.clone(),
                        message,
                    });
                }
            }
        }

        info!(summary = %report.summary(), "batch complete");
        Ok(report)
    }
}
