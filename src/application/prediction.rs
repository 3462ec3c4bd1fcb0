//! Single-record prediction.

use crate::domain::{FieldErrors, PatientFeatures, PatientRecord, PredictionResult};
use crate::ports::{ApiError, PredictionApi};

use super::fallback;
use super::lifecycle::{Lifecycle, Phase, Ticket};

/// Owns the request lifecycle of one patient prediction.
#[derive(Debug, Clone, Default)]
pub struct PredictionOrchestrator {
    state: Lifecycle<PredictionResult>,
    field_errors: FieldErrors,
}

impl PredictionOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every field, collecting all violations.
    ///
    /// # Errors
    /// Returns the field-keyed error map.
    pub fn validate(record: &PatientRecord) -> Result<PatientFeatures, FieldErrors> {
        record.validate()
    }

    /// Validate and, if the record is valid, enter `Loading`.
    ///
    /// Invalid input never reaches `Loading`. The errors are kept for inline
    /// display and returned, while the displayed result and any pending
    /// request stay as they were.
    ///
    /// # Errors
    /// Returns the field errors when validation fails.
    pub fn submit(
        &mut self,
        record: &PatientRecord,
    ) -> Result<(Ticket, PatientFeatures), FieldErrors> {
        let previous = self.state.validating();
        match Self::validate(record) {
            Ok(features) => {
                self.field_errors = FieldErrors::default();
                let ticket = self.state.begin();
                tracing::debug!("Prediction request issued (ticket {})", ticket.generation());
                Ok((ticket, features))
            }
            Err(errors) => {
                tracing::debug!("Prediction blocked by {} field error(s)", errors.len());
                self.field_errors = errors.clone();
                self.state.abandon(previous);
                Err(errors)
            }
        }
    }

    /// Apply the outcome of a prediction request.
    ///
    /// Returns `false` if the ticket was superseded by a newer submission
    /// or a reset.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<PredictionResult, ApiError>) -> bool {
        let outcome = match outcome {
            Ok(mut result) => {
                if result.timestamp.is_none() {
                    result.timestamp =
                        Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
                }
                Ok(result)
            }
            Err(err) => {
                tracing::warn!("Prediction failed: {}", err);
                Err(err.user_message(fallback::PREDICTION))
            }
        };
        self.state.resolve(ticket, outcome)
    }

    /// Validate, call the API on this thread, and resolve.
    pub fn predict_with<A>(&mut self, api: &A, record: &PatientRecord) -> &Phase<PredictionResult>
    where
        A: PredictionApi + ?Sized,
    {
        if let Ok((ticket, features)) = self.submit(record) {
            let outcome = api.predict(&features);
            self.resolve(ticket, outcome);
        }
        self.state.phase()
    }

    /// Clear result, error and field errors; a pending request is ignored
    /// when it completes.
    pub fn reset(&mut self) {
        self.state.reset();
        self.field_errors = FieldErrors::default();
    }

    #[must_use]
    pub fn phase(&self) -> &Phase<PredictionResult> {
        self.state.phase()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// The displayed prediction, if the last request succeeded.
    #[must_use]
    pub fn result(&self) -> Option<&PredictionResult> {
        self.state.value()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Inline errors from the last local validation.
    #[must_use]
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }
}
