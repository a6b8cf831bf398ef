//! Patient encounter models.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Upper bound on the chief complaint length accepted at the boundary.
pub const MAX_CHIEF_COMPLAINT_CHARS: usize = 500;

/// Upper bound on the free-text notes length accepted at the boundary.
pub const MAX_NOTES_CHARS: usize = 2000;

/// Record validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Patient sex as reported at intake.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    /// Anything that is not `male` or `female`
    #[default]
    #[serde(other)]
    Other,
}

/// Optional vital signs. Absent values are encoded as neutral.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Vitals {
    /// Temperature in °C
    #[serde(rename = "vital_temperature_c", default)]
    pub temperature_c: Option<f64>,
    /// Heart rate in beats per minute
    #[serde(rename = "vital_heart_rate", default)]
    pub heart_rate: Option<f64>,
    /// Systolic blood pressure in mmHg
    #[serde(rename = "vital_blood_pressure_systolic", default)]
    pub systolic: Option<f64>,
    /// Diastolic blood pressure in mmHg
    #[serde(rename = "vital_blood_pressure_diastolic", default)]
    pub diastolic: Option<f64>,
}

/// A single structured encounter submitted for prediction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Age in whole years
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub sex: Sex,
    #[serde(flatten)]
    pub vitals: Vitals,
    /// Reported symptoms (order carries no meaning)
    #[serde(default, deserialize_with = "lenient_terms")]
    pub symptom_list: Vec<String>,
    /// Past medical history terms
    #[serde(default, deserialize_with = "lenient_terms")]
    pub pmh_list: Vec<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub free_text_notes: Option<String>,
}

impl PatientRecord {
    /// Create a record with demographics only.
    pub fn new(age: u32, sex: Sex) -> Self {
        Self {
            age,
            sex,
            ..Self::default()
        }
    }

    /// Notes and chief complaint joined into one blob for keyword scanning.
    pub fn clinical_text(&self) -> String {
        format!(
            "{} {}",
            self.free_text_notes.as_deref().unwrap_or_default(),
            self.chief_complaint.as_deref().unwrap_or_default()
        )
    }

    /// Check whether any reported symptom contains `needle` (case-insensitive).
    pub fn has_symptom_containing(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.symptom_list
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
    }

    /// Check the intake bounds. The encoder does not call this; it is total
    /// over any record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("age", Some(self.age as f64), 0.0, 150.0)?;
        check_range("vital_temperature_c", self.vitals.temperature_c, 30.0, 45.0)?;
        check_range("vital_heart_rate", self.vitals.heart_rate, 30.0, 250.0)?;
        check_range(
            "vital_blood_pressure_systolic",
            self.vitals.systolic,
            50.0,
            300.0,
        )?;
        check_range(
            "vital_blood_pressure_diastolic",
            self.vitals.diastolic,
            30.0,
            200.0,
        )?;
        check_length(
            "chief_complaint",
            self.chief_complaint.as_deref(),
            MAX_CHIEF_COMPLAINT_CHARS,
        )?;
        check_length("free_text_notes", self.free_text_notes.as_deref(), MAX_NOTES_CHARS)?;
        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(ValidationError::OutOfRange {
            field,
            value: v,
            min,
            max,
        }),
        _ => Ok(()),
    }
}

fn check_length(field: &'static str, value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    match value {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}

/// Accept a term list while dropping entries that are not strings.
fn lenient_terms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}
