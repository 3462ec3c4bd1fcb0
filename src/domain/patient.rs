//! Patient records for diabetes risk prediction.
//!
//! Two shapes exist. [`PatientRecord`] is what a form or a CSV row produces:
//! any field may be missing and categorical values are free text. Validation
//! turns it into [`PatientFeatures`], whose types admit only in-domain values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// One of the eight features the prediction endpoint requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Gender,
    Age,
    Hypertension,
    HeartDisease,
    SmokingHistory,
    Bmi,
    Hba1cLevel,
    BloodGlucoseLevel,
}

impl Field {
    /// All fields in form/wire order.
    pub const ALL: [Field; 8] = [
        Field::Gender,
        Field::Age,
        Field::Hypertension,
        Field::HeartDisease,
        Field::SmokingHistory,
        Field::Bmi,
        Field::Hba1cLevel,
        Field::BloodGlucoseLevel,
    ];

    /// JSON / CSV key expected by the API.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Hypertension => "hypertension",
            Self::HeartDisease => "heart_disease",
            Self::SmokingHistory => "smoking_history",
            Self::Bmi => "bmi",
            Self::Hba1cLevel => "HbA1c_level",
            Self::BloodGlucoseLevel => "blood_glucose_level",
        }
    }

    /// Human-readable label used in messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Age => "Age",
            Self::Hypertension => "Hypertension",
            Self::HeartDisease => "Heart Disease",
            Self::SmokingHistory => "Smoking History",
            Self::Bmi => "BMI",
            Self::Hba1cLevel => "HbA1c Level",
            Self::BloodGlucoseLevel => "Blood Glucose Level",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Whether the API expects a number for this field.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Gender | Self::SmokingHistory)
    }

    /// Inclusive range for continuous fields.
    #[must_use]
    pub fn range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Age => Some((1.0, 120.0)),
            Self::Bmi => Some((10.0, 80.0)),
            Self::Hba1cLevel => Some((3.5, 15.0)),
            Self::BloodGlucoseLevel => Some((50.0, 400.0)),
            _ => None,
        }
    }

    /// Allowed terms for categorical fields.
    #[must_use]
    pub fn choices(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Gender => Some(Gender::TERMS),
            Self::SmokingHistory => Some(SmokingHistory::TERMS),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const TERMS: &'static [&'static str] = &["Male", "Female"];

    #[must_use]
    pub fn parse(term: &str) -> Option<Self> {
        match term {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmokingHistory {
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "former")]
    Former,
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "ever")]
    Ever,
    #[serde(rename = "not current")]
    NotCurrent,
    #[serde(rename = "No Info")]
    NoInfo,
}

impl SmokingHistory {
    pub const TERMS: &'static [&'static str] =
        &["never", "former", "current", "ever", "not current", "No Info"];

    #[must_use]
    pub fn parse(term: &str) -> Option<Self> {
        match term {
            "never" => Some(Self::Never),
            "former" => Some(Self::Former),
            "current" => Some(Self::Current),
            "ever" => Some(Self::Ever),
            "not current" => Some(Self::NotCurrent),
            "No Info" => Some(Self::NoInfo),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Former => "former",
            Self::Current => "current",
            Self::Ever => "ever",
            Self::NotCurrent => "not current",
            Self::NoInfo => "No Info",
        }
    }
}

/// A single value held by a [`PatientRecord`] field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// Patient data as entered, before validation.
///
/// This is also the wire shape of batch submissions: the server performs its
/// own validation there and reports problems per `loc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_flag"
    )]
    pub hypertension: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_flag"
    )]
    pub heart_disease: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoking_history: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,

    #[serde(
        rename = "HbA1c_level",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hba1c_level: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_glucose_level: Option<f64>,
}

/// Binary flags go out as integers when they are integral.
fn serialize_flag<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.fract() == 0.0 && v.is_finite() => serializer.serialize_i64(*v as i64),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

impl PatientRecord {
    /// Read a field's current value.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Gender => self.gender.clone().map(FieldValue::Text),
            Field::SmokingHistory => self.smoking_history.clone().map(FieldValue::Text),
            Field::Age => self.age.map(FieldValue::Number),
            Field::Hypertension => self.hypertension.map(FieldValue::Number),
            Field::HeartDisease => self.heart_disease.map(FieldValue::Number),
            Field::Bmi => self.bmi.map(FieldValue::Number),
            Field::Hba1cLevel => self.hba1c_level.map(FieldValue::Number),
            Field::BloodGlucoseLevel => self.blood_glucose_level.map(FieldValue::Number),
        }
    }

    /// Set a numeric field. Ignored for categorical fields.
    pub fn set_number(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::Age => &mut self.age,
            Field::Hypertension => &mut self.hypertension,
            Field::HeartDisease => &mut self.heart_disease,
            Field::Bmi => &mut self.bmi,
            Field::Hba1cLevel => &mut self.hba1c_level,
            Field::BloodGlucoseLevel => &mut self.blood_glucose_level,
            Field::Gender | Field::SmokingHistory => return,
        };
        *slot = Some(value);
    }

    /// Set a categorical field. Ignored for numeric fields.
    pub fn set_text(&mut self, field: Field, value: impl Into<String>) {
        match field {
            Field::Gender => self.gender = Some(value.into()),
            Field::SmokingHistory => self.smoking_history = Some(value.into()),
            _ => {}
        }
    }

    /// Check every field and collect all violations.
    ///
    /// # Errors
    /// Returns a field-keyed error map when any field is missing or out of
    /// its declared domain.
    pub fn validate(&self) -> Result<PatientFeatures, FieldErrors> {
        let mut errors = FieldErrors::default();

        let gender = match self.gender.as_deref() {
            None => {
                errors.insert(Field::Gender, required(Field::Gender));
                None
            }
            Some(term) => {
                let parsed = Gender::parse(term.trim());
                if parsed.is_none() {
                    errors.insert(Field::Gender, one_of(Field::Gender));
                }
                parsed
            }
        };

        let smoking_history = match self.smoking_history.as_deref() {
            None => {
                errors.insert(Field::SmokingHistory, required(Field::SmokingHistory));
                None
            }
            Some(term) => {
                let parsed = SmokingHistory::parse(term.trim());
                if parsed.is_none() {
                    errors.insert(Field::SmokingHistory, one_of(Field::SmokingHistory));
                }
                parsed
            }
        };

        let age = check_range(&mut errors, Field::Age, self.age);
        let bmi = check_range(&mut errors, Field::Bmi, self.bmi);
        let hba1c_level = check_range(&mut errors, Field::Hba1cLevel, self.hba1c_level);
        let blood_glucose_level =
            check_range(&mut errors, Field::BloodGlucoseLevel, self.blood_glucose_level);
        let hypertension = check_flag(&mut errors, Field::Hypertension, self.hypertension);
        let heart_disease = check_flag(&mut errors, Field::HeartDisease, self.heart_disease);

        match (
            gender,
            age,
            hypertension,
            heart_disease,
            smoking_history,
            bmi,
            hba1c_level,
            blood_glucose_level,
        ) {
            (
                Some(gender),
                Some(age),
                Some(hypertension),
                Some(heart_disease),
                Some(smoking_history),
                Some(bmi),
                Some(hba1c_level),
                Some(blood_glucose_level),
            ) if errors.is_empty() => Ok(PatientFeatures {
                gender,
                age,
                hypertension,
                heart_disease,
                smoking_history,
                bmi,
                hba1c_level,
                blood_glucose_level,
            }),
            _ => Err(errors),
        }
    }
}

fn required(field: Field) -> String {
    format!("{} is required", field.label())
}

fn one_of(field: Field) -> String {
    let terms = field.choices().unwrap_or_default().join(", ");
    format!("{} must be one of {}", field.label(), terms)
}

fn check_range(errors: &mut FieldErrors, field: Field, value: Option<f64>) -> Option<f64> {
    let Some(value) = value else {
        errors.insert(field, required(field));
        return None;
    };
    let (min, max) = field.range()?;
    if (min..=max).contains(&value) {
        Some(value)
    } else {
        errors.insert(
            field,
            format!("{} must be between {} and {}", field.label(), min, max),
        );
        None
    }
}

fn check_flag(errors: &mut FieldErrors, field: Field, value: Option<f64>) -> Option<u8> {
    match value {
        None => {
            errors.insert(field, required(field));
            None
        }
        Some(v) if v == 0.0 => Some(0),
        Some(v) if v == 1.0 => Some(1),
        Some(_) => {
            errors.insert(field, format!("{} must be 0 or 1", field.label()));
            None
        }
    }
}

/// Field-scoped validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct FieldErrors {
    errors: BTreeMap<Field, String>,
}

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Fields with a violation, in form order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn summary(&self) -> String {
        self.errors
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validated features, ready for the prediction endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    pub gender: Gender,
    pub age: f64,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub smoking_history: SmokingHistory,
    pub bmi: f64,
    #[serde(rename = "HbA1c_level")]
    pub hba1c_level: f64,
    pub blood_glucose_level: f64,
}

impl PatientFeatures {
    /// Back to the raw shape (e.g. to prefill a form).
    #[must_use]
    pub fn to_record(&self) -> PatientRecord {
        PatientRecord {
            gender: Some(self.gender.as_str().to_string()),
            age: Some(self.age),
            hypertension: Some(f64::from(self.hypertension)),
            heart_disease: Some(f64::from(self.heart_disease)),
            smoking_history: Some(self.smoking_history.as_str().to_string()),
            bmi: Some(self.bmi),
            hba1c_level: Some(self.hba1c_level),
            blood_glucose_level: Some(self.blood_glucose_level),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> PatientRecord {
    PatientRecord {
        gender: Some("Male".to_string()),
        age: Some(30.0),
        hypertension: Some(0.0),
        heart_disease: Some(0.0),
        smoking_history: Some("never".to_string()),
        bmi: Some(25.0),
        hba1c_level: Some(5.5),
        blood_glucose_level: Some(110.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_record() {
        let features = sample_record().validate().expect("Should validate");
        assert_eq!(features.gender, Gender::Male);
        assert_eq!(features.smoking_history, SmokingHistory::Never);
        assert_eq!(features.hypertension, 0);
        assert!((features.hba1c_level - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_age_out_of_range_message() {
        let mut record = sample_record();
        record.age = Some(200.0);

        let errors = record.validate().expect_err("Should reject age");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Age), Some("Age must be between 1 and 120"));
    }

    #[test]
    fn test_collects_all_violations() {
        let mut record = sample_record();
        record.age = Some(0.0);
        record.bmi = Some(95.0);
        record.hba1c_level = Some(2.0);
        record.blood_glucose_level = Some(401.0);

        let errors = record.validate().expect_err("Should reject");
        let fields: Vec<Field> = errors.fields().collect();
        assert_eq!(
            fields,
            vec![
                Field::Age,
                Field::Bmi,
                Field::Hba1cLevel,
                Field::BloodGlucoseLevel
            ]
        );
        assert_eq!(
            errors.get(Field::Hba1cLevel),
            Some("HbA1c Level must be between 3.5 and 15")
        );
    }

    #[test]
    fn test_missing_fields_are_required() {
        let errors = PatientRecord::default()
            .validate()
            .expect_err("Empty record is invalid");
        assert_eq!(errors.len(), Field::ALL.len());
        assert_eq!(errors.get(Field::Gender), Some("Gender is required"));
    }

    #[test]
    fn test_categorical_vocabulary() {
        let mut record = sample_record();
        record.gender = Some("Other".to_string());
        record.smoking_history = Some("sometimes".to_string());
        record.heart_disease = Some(2.0);

        let errors = record.validate().expect_err("Should reject");
        assert_eq!(
            errors.get(Field::Gender),
            Some("Gender must be one of Male, Female")
        );
        assert!(errors
            .get(Field::SmokingHistory)
            .is_some_and(|m| m.contains("not current")));
        assert_eq!(
            errors.get(Field::HeartDisease),
            Some("Heart Disease must be 0 or 1")
        );
    }

    #[test]
    fn test_wire_shape() {
        let features = sample_record().validate().expect("Should validate");
        let json = serde_json::to_value(features).expect("Should serialize");
        assert_eq!(json["HbA1c_level"], 5.5);
        assert_eq!(json["smoking_history"], "never");
        assert_eq!(json["hypertension"], 0);

        let raw = serde_json::to_value(sample_record()).expect("Should serialize");
        assert_eq!(raw["heart_disease"], 0);
        assert!(raw.get("HbA1c_level").is_some());
    }

    #[test]
    fn test_to_record_round_trip() {
        let features = sample_record().validate().expect("Should validate");
        assert_eq!(features.to_record(), sample_record());
    }

    fn out_of_domain(field: Field) -> BoxedStrategy<FieldValue> {
        match field {
            Field::Gender => prop_oneof![Just("male"), Just("Other"), Just("")]
                .prop_map(|s| FieldValue::Text(s.to_string()))
                .boxed(),
            Field::SmokingHistory => prop_oneof![Just("Never"), Just("daily"), Just("no info")]
                .prop_map(|s| FieldValue::Text(s.to_string()))
                .boxed(),
            Field::Hypertension | Field::HeartDisease => {
                prop_oneof![(2.0f64..100.0), (-100.0f64..-0.5), (0.01f64..0.99)]
                    .prop_map(FieldValue::Number)
                    .boxed()
            }
            other => {
                let (min, max) = other.range().unwrap_or((0.0, 0.0));
                prop_oneof![(min - 1000.0..min - 0.001), (max + 0.001..max + 1000.0)]
                    .prop_map(FieldValue::Number)
                    .boxed()
            }
        }
    }

    proptest! {
        #[test]
        fn prop_single_violation_is_scoped_to_its_field(
            (field, value) in proptest::sample::select(Field::ALL.to_vec())
                .prop_flat_map(|f| (Just(f), out_of_domain(f)))
        ) {
            let mut record = sample_record();
            match value {
                FieldValue::Number(n) => record.set_number(field, n),
                FieldValue::Text(t) => record.set_text(field, t),
            }

            let errors = record.validate().expect_err("Out-of-domain value must fail");
            prop_assert_eq!(errors.len(), 1);
            prop_assert!(errors.get(field).is_some_and(|m| !m.is_empty()));
        }
    }
}
