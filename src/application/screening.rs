//! Server-side validation of records without predicting.

use crate::domain::{FieldErrors, PatientFeatures, PatientRecord, ValidationReport};
use crate::ports::{ApiError, PredictionApi};

use super::fallback;
use super::lifecycle::{Lifecycle, Ticket};

/// Remote validation of one record and of a loaded batch.
#[derive(Debug, Clone, Default)]
pub struct ScreeningOrchestrator {
    single: Lifecycle<ValidationReport>,
    batch: Lifecycle<Vec<ValidationReport>>,
    submitted: usize,
}

impl ScreeningOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate locally, then enter `Loading` for the remote check.
    ///
    /// # Errors
    /// Returns the local field errors; nothing is sent and the last report
    /// stays on screen.
    pub fn submit(
        &mut self,
        record: &PatientRecord,
    ) -> Result<(Ticket, PatientFeatures), FieldErrors> {
        let previous = self.single.validating();
        match record.validate() {
            Ok(features) => Ok((self.single.begin(), features)),
            Err(errors) => {
                self.single.abandon(previous);
                Err(errors)
            }
        }
    }

    /// Apply a single-record report. Stale tickets are ignored.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<ValidationReport, ApiError>) -> bool {
        let outcome = outcome.map_err(|e| {
            tracing::warn!("Remote validation failed: {}", e);
            e.user_message(fallback::VALIDATION)
        });
        self.single.resolve(ticket, outcome)
    }

    /// Start a batch check of `count` records. An empty batch fails
    /// locally and returns `None`.
    pub fn submit_batch(&mut self, count: usize) -> Option<Ticket> {
        if count == 0 {
            self.batch.fail("Empty data list provided");
            return None;
        }
        self.submitted = count;
        Some(self.batch.begin())
    }

    /// Apply per-record reports; the count must match what was sent.
    pub fn resolve_batch(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<ValidationReport>, ApiError>,
    ) -> bool {
        let outcome = match outcome {
            Ok(reports) if reports.len() == self.submitted => Ok(reports),
            Ok(reports) => Err(format!(
                "Validation returned {} reports for {} records",
                reports.len(),
                self.submitted
            )),
            Err(err) => Err(err.user_message(fallback::VALIDATION)),
        };
        if let Err(message) = &outcome {
            tracing::warn!("Batch validation failed: {}", message);
        }
        self.batch.resolve(ticket, outcome)
    }

    /// Run a single-record check on this thread.
    pub fn validate_remote_with<A: PredictionApi + ?Sized>(
        &mut self,
        api: &A,
        record: &PatientRecord,
    ) -> Option<&ValidationReport> {
        if let Ok((ticket, features)) = self.submit(record) {
            let outcome = api.validate(&features);
            self.resolve(ticket, outcome);
        }
        self.single.value()
    }

    /// Run a batch check on this thread.
    pub fn validate_batch_remote_with<A: PredictionApi + ?Sized>(
        &mut self,
        api: &A,
        records: &[PatientRecord],
    ) -> Option<&[ValidationReport]> {
        if let Some(ticket) = self.submit_batch(records.len()) {
            let outcome = api.validate_batch(records);
            self.resolve_batch(ticket, outcome);
        }
        self.batch.value().map(Vec::as_slice)
    }

    /// Lifecycle of the single-record check.
    #[must_use]
    pub fn single(&self) -> &Lifecycle<ValidationReport> {
        &self.single
    }

    /// Lifecycle of the batch check.
    #[must_use]
    pub fn batch(&self) -> &Lifecycle<Vec<ValidationReport>> {
        &self.batch
    }

    /// Number of records flagged invalid in the last batch check.
    #[must_use]
    pub fn invalid_count(&self) -> Option<usize> {
        self.batch
            .value()
            .map(|reports| reports.iter().filter(|r| !r.valid).count())
    }

    /// Clear both checks; pending completions are dropped.
    pub fn reset(&mut self) {
        self.single.reset();
        self.batch.reset();
        self.submitted = 0;
    }
}
