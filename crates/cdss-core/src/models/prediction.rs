//! Prediction output models.

use serde::{Deserialize, Serialize};

/// Fixed warnings attached to every report.
pub const CLINICAL_WARNINGS: [&str; 3] = [
    "This is a preliminary assessment tool only",
    "Always consider patient history and clinical context",
    "Confirm diagnoses with appropriate diagnostic tests",
];

pub const DISCLAIMER: &str = "This is a preliminary prediction tool. Always consult with healthcare professionals for clinical decisions.";

/// A recommended diagnostic test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestRecommendation {
    pub test: String,
    /// CPT/LOINC code when known
    pub test_code: Option<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
    pub urgency: String,
}

/// A recommended medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationRecommendation {
    pub medication: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
    pub dose_suggestion: Option<String>,
    pub duration: Option<String>,
}

/// A single ranked diagnosis candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub icd10_code: String,
    pub diagnosis: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
    pub recommended_tests: Vec<TestRecommendation>,
    pub recommended_medications: Vec<MedicationRecommendation>,
    pub assessment_plan: String,
    /// Short strings naming the signals behind the candidate
    pub rationale: Vec<String>,
}

/// Which path produced a set of predictions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    /// Scored by a loaded model
    Model,
    /// Rule-based decision tree
    Fallback,
}

/// Envelope returned to callers of the predictor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionReport {
    pub request_id: String,
    pub predictions: Vec<Prediction>,
    pub mode: PredictionMode,
    pub model_version: String,
    pub processing_time_ms: f64,
    /// Floor applied to test recommendations
    pub confidence_threshold: f64,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub clinical_warnings: Vec<String>,
    pub disclaimer: String,
}

impl TestRecommendation {
    /// Create a routine-urgency recommendation.
    pub fn routine(test: &str, confidence: f64) -> Self {
        Self {
            test: test.to_string(),
            test_code: None,
            confidence,
            urgency: "routine".to_string(),
        }
    }
}

impl MedicationRecommendation {
    pub fn new(medication: &str, confidence: f64, dose: &str, duration: &str) -> Self {
        Self {
            medication: medication.to_string(),
            confidence,
            dose_suggestion: Some(dose.to_string()),
            duration: Some(duration.to_string()),
        }
    }
}

impl Prediction {
    /// The candidate returned when scoring fails mid-request.
    pub fn scoring_failure(reason: &str) -> Self {
        Self {
            icd10_code: "R69".to_string(),
            diagnosis: "Illness, unspecified".to_string(),
            confidence: 0.30,
            recommended_tests: Vec::new(),
            recommended_medications: Vec::new(),
            assessment_plan:
                "Unable to generate specific prediction. Recommend clinical evaluation.".to_string(),
            rationale: vec![format!("Prediction error: {}", reason)],
        }
    }
}

impl PredictionReport {
    /// Wrap predictions with request metadata.
    pub fn new(
        predictions: Vec<Prediction>,
        mode: PredictionMode,
        model_version: &str,
        processing_time_ms: f64,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            predictions,
            mode,
            model_version: model_version.to_string(),
            processing_time_ms,
            confidence_threshold,
            generated_at: chrono::Utc::now().to_rfc3339(),
            clinical_warnings: CLINICAL_WARNINGS.iter().map(|w| w.to_string()).collect(),
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    /// Get the highest-ranked prediction, if any.
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
