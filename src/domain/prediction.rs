//! Prediction results returned by the API.

use serde::{Deserialize, Serialize};

/// Display banding derived from probability.
///
/// The binary `prediction` flag stays authoritative for the risk banner; the
/// band only drives colour and wording of the probability gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band a probability: `< 0.33` low, `< 0.66` medium, otherwise high.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.33 {
            Self::Low
        } else if probability < 0.66 {
            Self::Medium
        } else {
            Self::High
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low probability band",
            Self::Medium => "Medium probability band - follow-up recommended",
            Self::High => "High probability band - consultation advised",
        }
    }

    /// RGB colour for terminal rendering.
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),
            Self::Medium => (251, 191, 36),
            Self::High => (244, 63, 94),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Result of a single prediction.
///
/// Older API builds name the flag `risk`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 1 = high risk, 0 = low risk.
    #[serde(alias = "risk")]
    pub prediction: u8,

    pub probability: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_id: Option<String>,
}

impl PredictionResult {
    #[must_use]
    pub fn is_high_risk(&self) -> bool {
        self.prediction == 1
    }

    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }

    /// Banner text keyed on the authoritative flag.
    #[must_use]
    pub fn risk_label(&self) -> &'static str {
        if self.is_high_risk() {
            "High Risk"
        } else {
            "Low Risk"
        }
    }

    /// Probability as a rounded whole percentage, e.g. `"92%"`.
    #[must_use]
    pub fn probability_percent(&self) -> String {
        format!("{:.0}%", (self.probability * 100.0).round())
    }

    #[must_use]
    pub fn confidence_percent(&self) -> String {
        match self.confidence {
            Some(c) => format!("{:.1}%", c * 100.0),
            None => "N/A".to_string(),
        }
    }

    #[must_use]
    pub fn recommendations(&self) -> &'static [&'static str] {
        if self.is_high_risk() {
            &[
                "Consult with a healthcare professional",
                "Monitor blood glucose levels regularly",
                "Consider lifestyle modifications",
                "Schedule follow-up appointments",
            ]
        } else {
            &[
                "Maintain current healthy lifestyle",
                "Continue regular health checkups",
                "Monitor for any changes in health",
                "Consider preventive measures",
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(prediction: u8, probability: f64) -> PredictionResult {
        PredictionResult {
            prediction,
            probability,
            confidence: None,
            model_version: None,
            timestamp: None,
            prediction_id: None,
        }
    }

    #[test]
    fn test_risk_band_thresholds() {
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.329), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.33), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.659), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.66), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
    }

    #[test]
    fn test_banner_follows_flag_not_band() {
        let flagged = result(1, 0.2);
        assert_eq!(flagged.risk_label(), "High Risk");
        assert_eq!(flagged.risk_level(), RiskLevel::Low);
        assert_eq!(result(0, 0.9).risk_label(), "Low Risk");
    }

    #[test]
    fn test_percentages() {
        let mut r = result(1, 0.92);
        assert_eq!(r.probability_percent(), "92%");
        assert_eq!(result(0, 0.125).probability_percent(), "13%");
        assert_eq!(r.confidence_percent(), "N/A");
        r.confidence = Some(0.95);
        assert_eq!(r.confidence_percent(), "95.0%");
    }

    #[test]
    fn test_accepts_both_flag_spellings() {
        let a: PredictionResult =
            serde_json::from_str(r#"{"prediction":1,"probability":0.8}"#).expect("parse");
        let b: PredictionResult =
            serde_json::from_str(r#"{"risk":1,"probability":0.8,"model_version":"1.0.0"}"#)
                .expect("parse");
        assert!(a.is_high_risk());
        assert!(b.is_high_risk());
        assert_eq!(b.model_version.as_deref(), Some("1.0.0"));
    }
}
