//! # Glucotrack
//!
//! Client-side orchestration for a diabetes-risk prediction service.
//!
//! This crate provides:
//! - Validated patient records and the prediction service's wire types
//! - A blocking HTTP client with uniform error normalization
//! - CSV ingestion of patient files and CSV export of batch results
//! - Request orchestrators with a stale-response guard
//! - A terminal UI for single and batch predictions and model metadata
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientRecord, PredictionResult, model metadata)
//! - `ports`: The `PredictionApi` trait
//! - `adapters`: Concrete implementations (reqwest, csv, log sanitizing)
//! - `application`: Orchestrators owning each view's request lifecycle
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{PatientRecord, PredictionResult, RiskLevel};

/// Result type for Glucotrack operations
pub type Result<T> = std::result::Result<T, GlucotrackError>;

/// Main error type for Glucotrack
#[derive(Debug, thiserror::Error)]
pub enum GlucotrackError {
    #[error("API request failed: {0}")]
    Api(#[from] ports::ApiError),

    #[error(transparent)]
    Parse(#[from] adapters::csv::ParseError),

    #[error("Invalid patient data: {0}")]
    Validation(#[from] domain::FieldErrors),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
