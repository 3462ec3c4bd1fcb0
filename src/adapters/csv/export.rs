//! CSV export of batch results.
//!
//! Columns follow the server's field order for each row; keys first seen in
//! later rows are appended. Output is deterministic for a given input.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::ResultRow;
use crate::GlucotrackError;

/// Name of the exported results file.
pub const EXPORT_FILE_NAME: &str = "diabetes_predictions.csv";

/// Serialize result rows to UTF-8 CSV bytes.
///
/// # Errors
/// Returns error if the CSV writer fails.
pub fn to_csv_bytes(rows: &[ResultRow]) -> Result<Vec<u8>, GlucotrackError> {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if !columns.is_empty() {
        wtr.write_record(&columns)?;
    }
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| row.get(*col).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&cells)?;
    }

    wtr.into_inner().map_err(|e| GlucotrackError::Io(e.into_error()))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

/// Write results into `dir` under [`EXPORT_FILE_NAME`], returning the path.
///
/// # Errors
/// Returns error on serialization or filesystem failure.
pub fn export_to_dir(rows: &[ResultRow], dir: &Path) -> Result<PathBuf, GlucotrackError> {
    let bytes = to_csv_bytes(rows)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    std::fs::write(&path, bytes)?;
    tracing::info!("Exported {} result rows to {}", rows.len(), path.display());
    Ok(path)
}
