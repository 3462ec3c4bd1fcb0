//! CSV ingestion: header row to keys, per-column coercion, code remapping.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::{codes, Field, PatientRecord};

/// A rejected cell, addressed by 1-based data row and column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "Missing value in row {}, column \"{}\"", self.row, self.column)
        } else {
            write!(
                f,
                "Invalid number in row {}, column \"{}\": {}",
                self.row, self.column, self.value
            )
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The CSV reader itself failed; its message is kept verbatim.
    #[error("CSV parsing error: {0}")]
    Malformed(String),

    #[error("No valid data rows found in CSV{}", first_rejection(.rejected))]
    NoValidRows { rejected: Vec<RowError> },

    #[error("Failed to read CSV file: {0}")]
    Io(#[from] std::io::Error),
}

fn first_rejection(rejected: &[RowError]) -> String {
    match rejected.first() {
        Some(err) if rejected.len() == 1 => format!(" ({err})"),
        Some(err) => format!(" ({err}; {} more)", rejected.len() - 1),
        None => String::new(),
    }
}

/// Accepted records plus the cells that caused rows to be dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvIngest {
    pub records: Vec<PatientRecord>,
    pub rejected: Vec<RowError>,
}

impl CsvIngest {
    /// Row numbers that were dropped, deduplicated and ascending.
    #[must_use]
    pub fn rejected_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.rejected.iter().map(|e| e.row).collect();
        rows.dedup();
        rows
    }
}

/// Parse a CSV file from disk.
///
/// # Errors
/// See [`parse_reader`].
pub fn parse_file(path: &Path) -> Result<CsvIngest, ParseError> {
    let file = File::open(path)?;
    tracing::info!("Parsing CSV file {}", path.display());
    parse_reader(file)
}

/// Parse CSV with a header row into patient records.
///
/// Numeric columns must coerce to finite numbers or the row is dropped.
/// Categorical columns given as integer codes are remapped to the API
/// vocabulary; unknown codes pass through. Unrecognized columns are ignored;
/// a numeric column missing from the header rejects every row.
///
/// # Errors
/// `Malformed` when the reader fails, `NoValidRows` when nothing survives.
pub fn parse_reader<R: Read>(reader: R) -> Result<CsvIngest, ParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ParseError::Malformed(e.to_string()))?
        .clone();
    let columns: Vec<Option<Field>> = headers.iter().map(resolve_column).collect();
    // A numeric column absent from the header fails coercion on every row.
    let missing: Vec<Field> = Field::ALL
        .iter()
        .copied()
        .filter(|f| f.is_numeric() && !columns.contains(&Some(*f)))
        .collect();
    if !missing.is_empty() {
        tracing::warn!("CSV header lacks {} numeric column(s)", missing.len());
    }

    let mut ingest = CsvIngest::default();

    for (index, row) in rdr.records().enumerate() {
        let row = row.map_err(|e| ParseError::Malformed(e.to_string()))?;
        let row_number = index + 1;

        let mut record = PatientRecord::default();
        let mut row_errors = Vec::new();

        for ((header, field), raw) in headers.iter().zip(columns.iter()).zip(row.iter()) {
            let Some(field) = field else {
                continue;
            };

            if field.is_numeric() {
                match raw.parse::<f64>() {
                    Ok(value) if value.is_finite() => record.set_number(*field, value),
                    _ => row_errors.push(RowError {
                        row: row_number,
                        column: header.to_string(),
                        value: raw.to_string(),
                    }),
                }
            } else if !raw.is_empty() {
                let value = match codes::table_for(field.key()) {
                    Some(table) => table.remap(raw),
                    None => raw.to_string(),
                };
                record.set_text(*field, value);
            }
        }

        row_errors.extend(missing.iter().map(|field| RowError {
            row: row_number,
            column: field.key().to_string(),
            value: String::new(),
        }));

        if row_errors.is_empty() {
            ingest.records.push(record);
        } else {
            tracing::debug!("Dropping CSV row {} ({} bad cells)", row_number, row_errors.len());
            ingest.rejected.extend(row_errors);
        }
    }

    if ingest.records.is_empty() {
        return Err(ParseError::NoValidRows {
            rejected: ingest.rejected,
        });
    }

    tracing::info!(
        "CSV ingested: {} records accepted, {} cells rejected",
        ingest.records.len(),
        ingest.rejected.len()
    );
    Ok(ingest)
}

/// Exact key match first, then case-insensitive.
fn resolve_column(header: &str) -> Option<Field> {
    Field::from_key(header).or_else(|| {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(header))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "gender,age,hypertension,heart_disease,smoking_history,bmi,HbA1c_level,blood_glucose_level";

    fn parse(text: &str) -> Result<CsvIngest, ParseError> {
        parse_reader(text.as_bytes())
    }

    #[test]
    fn test_parses_and_remaps_codes() {
        let text = format!("{HEADER}\n1,45,0,1,2,28.5,6.2,140\nFemale,30,0,0,never,22,5.1,90\n");
        let ingest = parse(&text).expect("Should parse");

        assert_eq!(ingest.records.len(), 2);
        let first = &ingest.records[0];
        assert_eq!(first.gender.as_deref(), Some("Male"));
        assert_eq!(first.smoking_history.as_deref(), Some("former"));
        assert_eq!(first.heart_disease, Some(1.0));
        assert_eq!(first.hba1c_level, Some(6.2));
        assert!(first.validate().is_ok());
        assert_eq!(ingest.records[1].gender.as_deref(), Some("Female"));
    }

    #[test]
    fn test_unmapped_code_passes_through() {
        let text = format!("{HEADER}\n9,45,0,0,7,28.5,6.2,140\n");
        let ingest = parse(&text).expect("Should parse");
        assert_eq!(ingest.records[0].gender.as_deref(), Some("9"));
        assert_eq!(ingest.records[0].smoking_history.as_deref(), Some("7"));
    }

    #[test]
    fn test_bad_number_drops_row_and_reports_cell() {
        let text = format!("{HEADER}\nMale,45,0,0,never,28.5,6.2,140\nMale,abc,0,0,never,28.5,6.2,140\n");
        let ingest = parse(&text).expect("Should parse");

        assert_eq!(ingest.records.len(), 1);
        assert_eq!(
            ingest.rejected,
            vec![RowError {
                row: 2,
                column: "age".to_string(),
                value: "abc".to_string()
            }]
        );
        assert_eq!(
            ingest.rejected[0].to_string(),
            "Invalid number in row 2, column \"age\": abc"
        );
    }

    #[test]
    fn test_single_bad_row_names_row_and_column() {
        let text = format!("{HEADER}\nMale,45,0,0,never,fat,6.2,140\n");
        let err = parse(&text).expect_err("Should fail");
        let ParseError::NoValidRows { rejected } = &err else {
            panic!("Expected NoValidRows, got {err:?}");
        };
        assert_eq!(rejected[0].row, 1);
        assert_eq!(rejected[0].column, "bmi");
        assert!(err.to_string().contains("row 1, column \"bmi\""));
    }

    #[test]
    fn test_empty_inputs_have_no_valid_rows() {
        assert!(matches!(
            parse(""),
            Err(ParseError::NoValidRows { ref rejected }) if rejected.is_empty()
        ));
        assert!(matches!(
            parse(&format!("{HEADER}\n")),
            Err(ParseError::NoValidRows { .. })
        ));
    }

    #[test]
    fn test_malformed_csv_surfaces_reader_message() {
        let text = format!("{HEADER}\nMale,45,0\n");
        let err = parse(&text).expect_err("Should fail");
        let ParseError::Malformed(message) = &err else {
            panic!("Expected Malformed, got {err:?}");
        };
        assert!(message.contains("fields"));
    }

    #[test]
    fn test_header_case_and_unknown_columns() {
        let text = "patient_id,GENDER,Age,hypertension,heart_disease,smoking_history,BMI,hba1c_level,blood_glucose_level\n\
                    P-1,0,61,1,0,3,31.2,7.4,210\n";
        let ingest = parse(text).expect("Should parse");
        let record = &ingest.records[0];
        assert_eq!(record.gender.as_deref(), Some("Female"));
        assert_eq!(record.smoking_history.as_deref(), Some("current"));
        assert_eq!(record.bmi, Some(31.2));
        assert_eq!(record.hba1c_level, Some(7.4));
    }

    #[test]
    fn test_missing_numeric_columns_reject_every_row() {
        let err = parse("glucose,insulin\n120,80\n").expect_err("Should fail");
        let ParseError::NoValidRows { rejected } = &err else {
            panic!("Expected NoValidRows, got {err:?}");
        };
        let columns: Vec<&str> = rejected.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(
            columns,
            vec!["age", "hypertension", "heart_disease", "bmi", "HbA1c_level", "blood_glucose_level"]
        );
        assert!(rejected.iter().all(|e| e.row == 1));
        assert_eq!(
            rejected[0].to_string(),
            "Missing value in row 1, column \"age\""
        );
    }

    #[test]
    fn test_one_missing_column_is_named() {
        let text = "gender,age,hypertension,heart_disease,smoking_history,bmi,HbA1c_level\n\
                    Male,45,0,0,never,28.5,6.2\n";
        let err = parse(text).expect_err("Should fail");
        assert!(err.to_string().contains("column \"blood_glucose_level\""));
    }

    #[test]
    fn test_rejects_non_finite_numbers() {
        let text = format!("{HEADER}\nMale,NaN,0,0,never,28.5,6.2,140\nMale,45,0,0,never,inf,6.2,140\nMale,45,0,0,never,28,6.2,140\n");
        let ingest = parse(&text).expect("Should parse");
        assert_eq!(ingest.records.len(), 1);
        assert_eq!(ingest.rejected_rows(), vec![1, 2]);
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(file, "{HEADER}").expect("write");
        writeln!(file, "Male,50,1,0,ever,27,6.0,150").expect("write");
        let ingest = parse_file(file.path()).expect("Should parse");
        assert_eq!(ingest.records.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_file(Path::new("/nonexistent/patients.csv")).expect_err("Should fail");
        assert!(matches!(err, ParseError::Io(_)));
    }
}
