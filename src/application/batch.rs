//! Batch prediction: CSV-loaded records in, per-row results out.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::adapters::csv::{self, CsvIngest, ParseError, RowError};
use crate::domain::{
    format_issues, BatchOutcome, BatchResult, BatchSummary, PatientRecord, ResultRow,
};
use crate::ports::{ApiError, PredictionApi};
use crate::GlucotrackError;

use super::fallback;
use super::lifecycle::{Lifecycle, Phase, Ticket};

/// Server-side cap on records per request.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Rows shown in the results table.
pub const PREVIEW_ROWS: usize = 10;

const EMPTY_BATCH: &str = "Empty data list provided";
const OVERSIZED_BATCH: &str = "Batch size too large - maximum 1000 patients per request";

#[derive(Debug, Clone, Default)]
pub struct BatchOrchestrator {
    records: Vec<PatientRecord>,
    rejected: Vec<RowError>,
    parse_error: Option<String>,
    state: Lifecycle<BatchResult>,
    submitted: usize,
}

impl BatchOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a CSV file. A failure becomes the parse banner and
    /// leaves no records loaded.
    pub fn load_csv(&mut self, path: &Path) -> bool {
        self.apply_ingest(csv::parse_file(path))
    }

    /// Same as [`load_csv`](Self::load_csv) for CSV text from any reader.
    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> bool {
        self.apply_ingest(csv::parse_reader(reader))
    }

    fn apply_ingest(&mut self, ingest: Result<CsvIngest, ParseError>) -> bool {
        self.state.reset();
        match ingest {
            Ok(CsvIngest { records, rejected }) => {
                self.records = records;
                self.rejected = rejected;
                self.parse_error = None;
                true
            }
            Err(err) => {
                tracing::warn!("CSV load failed: {}", err);
                self.records.clear();
                self.rejected = match &err {
                    ParseError::NoValidRows { rejected } => rejected.clone(),
                    _ => Vec::new(),
                };
                self.parse_error = Some(err.to_string());
                false
            }
        }
    }

    /// Hide the parse banner. Rejected rows stay listed.
    pub fn dismiss_parse_error(&mut self) {
        self.parse_error = None;
    }

    /// Enter `Loading` for `count` records, or fail locally for an empty or
    /// oversized batch.
    pub fn submit(&mut self, count: usize) -> Option<Ticket> {
        if count == 0 {
            self.state.fail(EMPTY_BATCH);
            return None;
        }
        if count > MAX_BATCH_SIZE {
            tracing::warn!("Refusing batch of {} records", count);
            self.state.fail(OVERSIZED_BATCH);
            return None;
        }
        self.submitted = count;
        let ticket = self.state.begin();
        tracing::debug!(
            "Batch request issued for {} records (ticket {})",
            count,
            ticket.generation()
        );
        Some(ticket)
    }

    /// Validate every record locally, then enter `Loading`.
    ///
    /// Any out-of-domain or missing field refuses the whole batch with one
    /// `row N: <message>` line per violation; nothing is sent.
    pub fn submit_records(&mut self, records: &[PatientRecord]) -> Option<Ticket> {
        let violations = row_violations(records);
        if !violations.is_empty() {
            tracing::debug!("Batch blocked by {} field error(s)", violations.len());
            self.state.fail(violations.join("\n"));
            return None;
        }
        self.submit(records.len())
    }

    /// Submit the loaded records; returns the ticket and a copy of the
    /// records to send.
    pub fn submit_loaded(&mut self) -> Option<(Ticket, Vec<PatientRecord>)> {
        let records = self.records.clone();
        let ticket = self.submit_records(&records)?;
        Some((ticket, records))
    }

    /// Apply a raw batch response.
    ///
    /// Structured validation payloads and row-count mismatches become errors
    /// so that no summary or table is rendered for them.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<Value, ApiError>) -> bool {
        let outcome = match outcome {
            Ok(body) => match BatchOutcome::from_value(body) {
                Ok(BatchOutcome::Predictions(result)) if result.len() == self.submitted => {
                    Ok(result)
                }
                Ok(BatchOutcome::Predictions(result)) => Err(format!(
                    "Batch response has {} results for {} records",
                    result.len(),
                    self.submitted
                )),
                Ok(BatchOutcome::Rejected(issues)) => Err(format_issues(&issues)),
                Err(message) => Err(message),
            },
            Err(err) => Err(err.user_message(fallback::BATCH)),
        };
        if let Err(message) = &outcome {
            tracing::warn!("Batch prediction failed: {}", message);
        }
        self.state.resolve(ticket, outcome)
    }

    /// Submit `records`, call the API on this thread, and resolve.
    pub fn batch_predict_with<A>(&mut self, api: &A, records: &[PatientRecord]) -> &Phase<BatchResult>
    where
        A: PredictionApi + ?Sized,
    {
        if let Some(ticket) = self.submit_records(records) {
            let outcome = api.batch_predict(records);
            self.resolve(ticket, outcome);
        }
        self.state.phase()
    }

    /// Total, high-risk and low-risk counts.
    #[must_use]
    pub fn summarize(result: &BatchResult) -> BatchSummary {
        result.summary()
    }

    /// Serialize results in the server's column order.
    ///
    /// # Errors
    /// Returns error if the CSV writer fails.
    pub fn export_csv(result: &BatchResult) -> Result<Vec<u8>, GlucotrackError> {
        csv::to_csv_bytes(&result.rows)
    }

    /// Write `diabetes_predictions.csv` into `dir`.
    ///
    /// # Errors
    /// Returns error on serialization or filesystem failure.
    pub fn export_to_dir(result: &BatchResult, dir: &Path) -> Result<PathBuf, GlucotrackError> {
        csv::export_to_dir(&result.rows, dir)
    }

    /// Drop loaded records, results and banners.
    pub fn reset(&mut self) {
        self.state.reset();
        self.records.clear();
        self.rejected.clear();
        self.parse_error = None;
        self.submitted = 0;
    }

    /// Records loaded from the last CSV.
    #[must_use]
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    /// Cells that failed to parse in the last CSV.
    #[must_use]
    pub fn rejected(&self) -> &[RowError] {
        &self.rejected
    }

    /// Banner text for a failed load, until dismissed.
    #[must_use]
    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    #[must_use]
    pub fn phase(&self) -> &Phase<BatchResult> {
        self.state.phase()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    #[must_use]
    pub fn result(&self) -> Option<&BatchResult> {
        self.state.value()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Summary of the displayed result, if any.
    #[must_use]
    pub fn summary(&self) -> Option<BatchSummary> {
        self.result().map(Self::summarize)
    }

    /// The first rows of the result, for the on-screen table.
    #[must_use]
    pub fn preview_rows(&self) -> &[ResultRow] {
        match self.result() {
            Some(result) => &result.rows[..result.rows.len().min(PREVIEW_ROWS)],
            None => &[],
        }
    }

    /// Note under a truncated table, e.g. "Showing first 10 of 250".
    #[must_use]
    pub fn preview_note(&self) -> Option<String> {
        let total = self.result()?.len();
        (total > PREVIEW_ROWS).then(|| format!("Showing first {PREVIEW_ROWS} of {total}"))
    }
}

/// Field violations across `records`, addressed by 1-based row.
fn row_violations(records: &[PatientRecord]) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| record.validate().err().map(|errors| (i + 1, errors)))
        .flat_map(|(row, errors)| {
            errors
                .iter()
                .map(|(_, message)| format!("row {row}: {message}"))
                .collect::<Vec<_>>()
        })
        .collect()
}
