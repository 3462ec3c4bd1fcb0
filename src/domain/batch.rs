//! Batch prediction results.
//!
//! Rows are kept as the server sent them (ordered JSON objects) so that CSV
//! export reproduces the server's columns in the server's order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result row as returned by the server.
pub type ResultRow = Map<String, Value>;

/// Aggregate counts over a batch result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub high_risk: usize,
    pub low_risk: usize,
}

/// Successful batch response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub rows: Vec<ResultRow>,
    pub processing_time_seconds: Option<f64>,
    pub batch_id: Option<String>,
}

impl BatchResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count high-risk rows; every other row is low risk.
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let total = self.rows.len();
        let high_risk = self
            .rows
            .iter()
            .filter(|row| risk_flag(row) == Some(1))
            .count();
        BatchSummary {
            total,
            high_risk,
            low_risk: total - high_risk,
        }
    }

    /// Processing time as shown to the user, e.g. `"0.42s"`.
    #[must_use]
    pub fn processing_time_label(&self) -> String {
        match self.processing_time_seconds {
            Some(secs) => format!("{secs:.2}s"),
            None => "N/A".to_string(),
        }
    }
}

/// The per-row risk flag, under either of its observed names.
#[must_use]
pub fn risk_flag(row: &ResultRow) -> Option<i64> {
    row.get("prediction")
        .or_else(|| row.get("risk"))
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
}

#[must_use]
pub fn row_probability(row: &ResultRow) -> Option<f64> {
    row.get("probability").and_then(Value::as_f64)
}

/// One entry of a structured validation-error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub loc: Vec<Value>,
    pub msg: String,
}

impl ValidationIssue {
    /// Location joined with dots, e.g. `body.data.0.age`.
    #[must_use]
    pub fn path(&self) -> String {
        self.loc
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path(), self.msg)
    }
}

/// Join issues one per line.
#[must_use]
pub fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detect a validation-error payload: either a bare array of `{loc, msg}`
/// entries or an object whose `detail` is such an array.
#[must_use]
pub fn validation_issues(value: &Value) -> Option<Vec<ValidationIssue>> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(obj) => match obj.get("detail") {
            Some(Value::Array(entries)) => entries,
            _ => return None,
        },
        _ => return None,
    };
    if entries.is_empty() {
        return None;
    }
    entries
        .iter()
        .map(|entry| {
            let obj = entry.as_object()?;
            let loc = match obj.get("loc")? {
                Value::Array(parts) => parts.clone(),
                single => vec![single.clone()],
            };
            let msg = obj.get("msg")?.as_str()?.to_string();
            Some(ValidationIssue { loc, msg })
        })
        .collect()
}

/// What a batch endpoint answered with.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Predictions(BatchResult),
    Rejected(Vec<ValidationIssue>),
}

impl BatchOutcome {
    /// Classify a raw response body.
    ///
    /// # Errors
    /// Returns a message when the body is neither a prediction payload nor a
    /// validation-error payload.
    pub fn from_value(value: Value) -> Result<Self, String> {
        if let Some(issues) = validation_issues(&value) {
            return Ok(Self::Rejected(issues));
        }

        match value {
            Value::Array(rows) => Ok(Self::Predictions(BatchResult {
                rows: into_rows(rows)?,
                ..Default::default()
            })),
            Value::Object(mut obj) => {
                let rows = obj
                    .remove("predictions")
                    .or_else(|| obj.remove("results"))
                    .ok_or_else(|| "Batch response has no predictions".to_string())?;
                let Value::Array(rows) = rows else {
                    return Err("Batch predictions are not a list".to_string());
                };
                Ok(Self::Predictions(BatchResult {
                    rows: into_rows(rows)?,
                    processing_time_seconds: obj
                        .get("processing_time_seconds")
                        .and_then(Value::as_f64),
                    batch_id: obj.get("batch_id").and_then(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    }),
                }))
            }
            _ => Err("Unexpected batch response".to_string()),
        }
    }
}

fn into_rows(values: Vec<Value>) -> Result<Vec<ResultRow>, String> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Object(row) => Ok(row),
            _ => Err(format!("Batch result row {} is not an object", i + 1)),
        })
        .collect()
}
