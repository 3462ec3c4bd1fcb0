//! Read-only model and service metadata.
//!
//! Field names differ between API builds, so these types accept the
//! spellings observed in the wild and leave anything else optional.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, alias = "model_type")]
    pub algorithm: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default, alias = "created_at")]
    pub trained_at: Option<String>,

    #[serde(default)]
    pub roc_auc: Option<f64>,

    /// Number of input features.
    #[serde(default, alias = "features_count")]
    pub features: Option<u32>,
}

impl ModelInfo {
    /// Training date for display, when the timestamp parses.
    #[must_use]
    pub fn trained_on(&self) -> Option<chrono::NaiveDate> {
        let raw = self.trained_at.as_deref()?;
        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
            return Some(ts.date_naive());
        }
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|dt| dt.date())
            .or_else(|_| chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub recall: Option<f64>,
    #[serde(default)]
    pub f1_score: Option<f64>,
    #[serde(default)]
    pub roc_auc: Option<f64>,
    #[serde(default)]
    pub confusion_matrix: Option<Vec<Vec<u64>>>,
}

impl ModelMetrics {
    /// Named scalar metrics, skipping those the server did not report.
    #[must_use]
    pub fn scalars(&self) -> Vec<(&'static str, f64)> {
        [
            ("Accuracy", self.accuracy),
            ("Precision", self.precision),
            ("Recall", self.recall),
            ("F1 Score", self.f1_score),
            ("ROC AUC", self.roc_auc),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Numeric,
    Categorical,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: FeatureKind,

    #[serde(default)]
    pub required: Option<bool>,

    #[serde(default)]
    pub min_value: Option<f64>,

    #[serde(default)]
    pub max_value: Option<f64>,

    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
}

impl FeatureDescriptor {
    /// Short description of the accepted domain.
    #[must_use]
    pub fn domain(&self) -> String {
        if let Some(values) = &self.allowed_values {
            return values.join(", ");
        }
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => format!("{min} - {max}"),
            (Some(min), None) => format!(">= {min}"),
            (None, Some(max)) => format!("<= {max}"),
            (None, None) => "-".to_string(),
        }
    }
}

/// Response of the feature-names endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCatalog {
    #[serde(alias = "feature_names")]
    pub features: Vec<FeatureDescriptor>,
}

/// Health or readiness status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub model_loaded: Option<bool>,
    #[serde(default)]
    pub scaler_loaded: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ServiceStatus {
    /// One-word summary for the dashboard.
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.status, self.ready) {
            (Some(status), _) => status.clone(),
            (None, Some(true)) => "ready".to_string(),
            (None, Some(false)) => "not ready".to_string(),
            (None, None) => "unknown".to_string(),
        }
    }
}

/// Response of the remote validation endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Response of the reload endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReloadStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "model_version")]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_info_aliases() {
        let info: ModelInfo = serde_json::from_str(
            r#"{"model_type":"LightGBM","version":"1.2.0","created_at":"2024-05-01T10:00:00Z","features_count":8}"#,
        )
        .expect("parse");
        assert_eq!(info.algorithm.as_deref(), Some("LightGBM"));
        assert_eq!(info.features, Some(8));
        assert_eq!(
            info.trained_on(),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn test_naive_training_timestamp() {
        let info = ModelInfo {
            trained_at: Some("2024-05-01T10:00:00.123456".to_string()),
            ..Default::default()
        };
        assert_eq!(
            info.trained_on(),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn test_feature_catalog_both_keys() {
        let a: FeatureCatalog = serde_json::from_str(
            r#"{"features":[{"name":"gender","type":"categorical","allowed_values":["Male","Female"]}]}"#,
        )
        .expect("parse");
        let b: FeatureCatalog = serde_json::from_str(
            r#"{"feature_names":[{"name":"age","type":"numeric","min_value":0,"max_value":120}]}"#,
        )
        .expect("parse");
        assert_eq!(a.features[0].kind, FeatureKind::Categorical);
        assert_eq!(a.features[0].domain(), "Male, Female");
        assert_eq!(b.features[0].domain(), "0 - 120");
    }

    #[test]
    fn test_metrics_scalars_skip_missing() {
        let metrics = ModelMetrics {
            accuracy: Some(0.97),
            roc_auc: Some(0.98),
            ..Default::default()
        };
        let names: Vec<&str> = metrics.scalars().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["Accuracy", "ROC AUC"]);
    }

    #[test]
    fn test_status_summary() {
        let health: ServiceStatus = serde_json::from_str(r#"{"status":"ok"}"#).expect("parse");
        let ready: ServiceStatus =
            serde_json::from_str(r#"{"ready":false,"model_loaded":false,"scaler_loaded":true}"#)
                .expect("parse");
        assert_eq!(health.summary(), "ok");
        assert_eq!(ready.summary(), "not ready");
    }
}
