//! Categorical code tables.
//!
//! Exported datasets often carry categorical columns as small integers. The
//! prediction API expects the string vocabulary instead, so CSV ingestion
//! remaps codes through these tables before records are submitted.

/// A bidirectional mapping between integer codes and API vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct CodeTable {
    /// Column the table applies to (wire key).
    pub column: &'static str,
    entries: &'static [(i64, &'static str)],
}

impl CodeTable {
    const fn new(column: &'static str, entries: &'static [(i64, &'static str)]) -> Self {
        Self { column, entries }
    }

    /// Look up the vocabulary term for a numeric code.
    #[must_use]
    pub fn decode(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, term)| *term)
    }

    /// Look up the numeric code for a vocabulary term.
    #[must_use]
    pub fn encode(&self, term: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(_, t)| *t == term)
            .map(|(c, _)| *c)
    }

    /// All `(code, term)` pairs in declaration order.
    #[must_use]
    pub fn entries(&self) -> &'static [(i64, &'static str)] {
        self.entries
    }

    /// Remap a raw cell value.
    ///
    /// Integer codes found in the table are replaced by their term. Anything
    /// else (terms, unknown codes, non-integers) is returned unchanged.
    #[must_use]
    pub fn remap(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match parse_code(trimmed).and_then(|code| self.decode(code)) {
            Some(term) => term.to_string(),
            None => trimmed.to_string(),
        }
    }
}

/// Accepts `"1"` as well as `"1.0"`, which spreadsheet exports like to emit.
fn parse_code(raw: &str) -> Option<i64> {
    if let Ok(code) = raw.parse::<i64>() {
        return Some(code);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.fract() == 0.0 && value.is_finite() {
        Some(value as i64)
    } else {
        None
    }
}

/// Gender codes as they appear in the training dataset exports.
pub const GENDER_CODES: CodeTable =
    CodeTable::new("gender", &[(0, "Female"), (1, "Male"), (2, "Other")]);

/// Smoking history codes, matching the encoding used by the model pipeline.
pub const SMOKING_CODES: CodeTable = CodeTable::new(
    "smoking_history",
    &[
        (0, "never"),
        (1, "No Info"),
        (2, "former"),
        (3, "current"),
        (4, "ever"),
        (5, "not current"),
    ],
);

/// Tables applied during ingestion, keyed by column.
pub const CATEGORICAL_TABLES: [CodeTable; 2] = [GENDER_CODES, SMOKING_CODES];

/// Find the code table for a column, if the column is categorical.
#[must_use]
pub fn table_for(column: &str) -> Option<&'static CodeTable> {
    CATEGORICAL_TABLES.iter().find(|t| t.column == column)
}
