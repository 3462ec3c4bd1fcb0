//! Domain layer: patient records, prediction results and model metadata.
//!
//! Pure types with serde wire shapes and validation. Nothing here performs I/O.

mod batch;
pub mod codes;
mod model;
mod patient;
mod prediction;

pub use batch::{
    format_issues, risk_flag, row_probability, validation_issues, BatchOutcome, BatchResult,
    BatchSummary, ResultRow, ValidationIssue,
};
pub use model::{
    FeatureCatalog, FeatureDescriptor, FeatureKind, ModelInfo, ModelMetrics, ReloadStatus,
    ServiceStatus, ValidationReport,
};
pub use patient::{
    Field, FieldErrors, FieldValue, Gender, PatientFeatures, PatientRecord, SmokingHistory,
};
pub use prediction::{PredictionResult, RiskLevel};

#[cfg(test)]
pub(crate) use patient::sample_record;
