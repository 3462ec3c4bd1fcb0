//! Application layer: one orchestrator per view.
//!
//! Orchestrators own `{loading, result, error}` as explicit values and are
//! driven in two halves: a `submit`/`begin` that hands out a [`Ticket`], and a
//! `resolve` that applies the outcome if the ticket is still current. The
//! `*_with` helpers run both halves on the calling thread.

mod batch;
mod lifecycle;
mod model;
mod prediction;
mod screening;
mod status;

pub use batch::{BatchOrchestrator, MAX_BATCH_SIZE, PREVIEW_ROWS};
pub use lifecycle::{Lifecycle, Phase, Ticket};
pub use model::{MetadataKind, ModelOrchestrator};
pub use prediction::PredictionOrchestrator;
pub use screening::ScreeningOrchestrator;
pub use status::{Probe, StatusOrchestrator};

/// Per-operation messages used when the server gives no `detail`.
pub mod fallback {
    pub const PREDICTION: &str = "Prediction failed";
    pub const BATCH: &str = "Batch prediction failed";
    pub const MODEL_INFO: &str = "Failed to fetch model info";
    pub const METRICS: &str = "Failed to fetch metrics";
    pub const FEATURES: &str = "Failed to fetch features";
    pub const RELOAD: &str = "Failed to reload model";
    pub const HEALTH: &str = "Health check failed";
    pub const READY: &str = "Ready check failed";
    pub const VALIDATION: &str = "Validation failed";
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted `PredictionApi` for orchestrator tests.

    use std::sync::Mutex;

    use serde_json::Value;

    use crate::domain::{
        FeatureCatalog, ModelInfo, ModelMetrics, PatientFeatures, PatientRecord,
        PredictionResult, ReloadStatus, ServiceStatus, ValidationReport,
    };
    use crate::ports::{ApiError, PredictionApi};

    type Script<T> = Option<Result<T, ApiError>>;

    /// Unscripted operations answer with a network error.
    #[derive(Default)]
    pub(crate) struct ScriptedApi {
        pub health: Script<ServiceStatus>,
        pub ready: Script<ServiceStatus>,
        pub predict: Script<PredictionResult>,
        pub batch: Script<Value>,
        pub info: Script<ModelInfo>,
        pub metrics: Script<ModelMetrics>,
        pub features: Script<FeatureCatalog>,
        pub reload: Script<ReloadStatus>,
        pub validate: Script<ValidationReport>,
        pub validate_batch: Script<Vec<ValidationReport>>,
        pub calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedApi {
        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        pub fn count(&self, name: &str) -> usize {
            self.calls().iter().filter(|c| **c == name).count()
        }

        fn answer<T: Clone>(&self, name: &'static str, script: &Script<T>) -> Result<T, ApiError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(name);
            }
            script.clone().unwrap_or_else(|| Err(ApiError::network()))
        }
    }

    impl PredictionApi for ScriptedApi {
        fn health(&self) -> Result<ServiceStatus, ApiError> {
            self.answer("health", &self.health)
        }

        fn ready(&self) -> Result<ServiceStatus, ApiError> {
            self.answer("ready", &self.ready)
        }

        fn predict(&self, _features: &PatientFeatures) -> Result<PredictionResult, ApiError> {
            self.answer("predict", &self.predict)
        }

        fn batch_predict(&self, _records: &[PatientRecord]) -> Result<Value, ApiError> {
            self.answer("batch_predict", &self.batch)
        }

        fn model_info(&self) -> Result<ModelInfo, ApiError> {
            self.answer("model_info", &self.info)
        }

        fn model_metrics(&self) -> Result<ModelMetrics, ApiError> {
            self.answer("model_metrics", &self.metrics)
        }

        fn model_features(&self) -> Result<FeatureCatalog, ApiError> {
            self.answer("model_features", &self.features)
        }

        fn reload_model(&self) -> Result<ReloadStatus, ApiError> {
            self.answer("reload_model", &self.reload)
        }

        fn validate(&self, _features: &PatientFeatures) -> Result<ValidationReport, ApiError> {
            self.answer("validate", &self.validate)
        }

        fn validate_batch(
            &self,
            _records: &[PatientRecord],
        ) -> Result<Vec<ValidationReport>, ApiError> {
            self.answer("validate_batch", &self.validate_batch)
        }
    }

    pub(crate) fn detail_error(status: u16, detail: &str) -> ApiError {
        ApiError::from_response(status, &serde_json::json!({ "detail": detail }).to_string())
    }
}
