//! Prediction API port: every remote operation the client performs.
//!
//! The HTTP adapter implements this against the real service; tests use a
//! scripted fake.

use serde_json::Value;

use crate::domain::{
    format_issues, validation_issues, FeatureCatalog, ModelInfo, ModelMetrics, PatientFeatures,
    PatientRecord, PredictionResult, ReloadStatus, ServiceStatus, ValidationReport,
};

/// Message used when no response was received at all.
pub const NO_RESPONSE: &str = "no response";

/// Normalized failure of a remote call.
///
/// `status_code` is `None` when the request never got a response (timeout,
/// refused connection, DNS failure).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
    pub detail: Option<String>,
}

impl ApiError {
    /// No response received.
    #[must_use]
    pub fn network() -> Self {
        Self {
            message: NO_RESPONSE.to_string(),
            status_code: None,
            detail: None,
        }
    }

    /// Build from a non-2xx status and the raw response body.
    ///
    /// `detail` is taken from the body's `detail` field: strings verbatim,
    /// structured validation entries as `loc: msg` lines.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| extract_detail(&value));
        let message = detail
            .clone()
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        Self {
            message,
            status_code: Some(status),
            detail,
        }
    }

    /// A response arrived but could not be decoded.
    #[must_use]
    pub fn decode(status: u16, reason: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Invalid response body: {reason}"),
            status_code: Some(status),
            detail: None,
        }
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        self.status_code.is_none()
    }

    /// Text to show the user: the server's detail, else the caller's fallback.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail.clone().unwrap_or_else(|| fallback.to_string())
    }
}

fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(_) => validation_issues(body).map(|issues| format_issues(&issues)),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Remote operations of the prediction service.
pub trait PredictionApi: Send + Sync {
    fn health(&self) -> Result<ServiceStatus, ApiError>;

    fn ready(&self) -> Result<ServiceStatus, ApiError>;

    fn predict(&self, features: &PatientFeatures) -> Result<PredictionResult, ApiError>;

    /// Submit `{ "data": records }`. The raw body is returned because the
    /// server may answer 2xx with a validation-error payload.
    fn batch_predict(&self, records: &[PatientRecord]) -> Result<Value, ApiError>;

    fn model_info(&self) -> Result<ModelInfo, ApiError>;

    fn model_metrics(&self) -> Result<ModelMetrics, ApiError>;

    fn model_features(&self) -> Result<FeatureCatalog, ApiError>;

    fn reload_model(&self) -> Result<ReloadStatus, ApiError>;

    fn validate(&self, features: &PatientFeatures) -> Result<ValidationReport, ApiError>;

    fn validate_batch(&self, records: &[PatientRecord])
        -> Result<Vec<ValidationReport>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail() {
        let err = ApiError::from_response(503, r#"{"detail":"Model or scaler not loaded - service not ready"}"#);
        assert_eq!(err.status_code, Some(503));
        assert_eq!(
            err.user_message("Prediction failed"),
            "Model or scaler not loaded - service not ready"
        );
    }

    #[test]
    fn test_structured_detail() {
        let err = ApiError::from_response(
            422,
            r#"{"detail":[{"loc":["body","age"],"msg":"Input should be less than or equal to 120"}]}"#,
        );
        assert_eq!(
            err.detail.as_deref(),
            Some("body.age: Input should be less than or equal to 120")
        );
    }

    #[test]
    fn test_missing_detail_uses_fallback() {
        let err = ApiError::from_response(500, "<html>Internal Server Error</html>");
        assert!(err.detail.is_none());
        assert_eq!(err.user_message("Batch prediction failed"), "Batch prediction failed");
        assert!(err.message.contains("500"));
    }

    #[test]
    fn test_network_error() {
        let err = ApiError::network();
        assert!(err.is_network());
        assert_eq!(err.to_string(), "no response");
        assert_eq!(err.user_message("Prediction failed"), "Prediction failed");
    }
}
