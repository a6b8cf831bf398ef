//! Rule-based predictions used when no scoring model is loaded.
//!
//! Branches are evaluated in a fixed order:
//! 1. fever above 38.0°C with a cough symptom → pneumonia
//! 2. otherwise fever above 37.5°C → fever, unspecified
//! 3. a headache symptom → headache
//! 4. otherwise a cough symptom, when branch 1 did not fire → bronchitis
//! 5. nothing fired → general examination
//!
//! The list is then padded from the catalog disease table up to three
//! candidates. Thresholds and confidences are fixed; changing them changes
//! output parity with deployed behavior.

use crate::catalog::ReferenceCatalog;
use crate::models::{MedicationRecommendation, PatientRecord, Prediction, TestRecommendation};

/// Candidates returned per request.
pub const FALLBACK_CANDIDATES: usize = 3;

const PNEUMONIA_TEMP_C: f64 = 38.0;
const FEVER_TEMP_C: f64 = 37.5;

const CHEST_XRAY: &str = "Chest X-ray (PA/AP)";
const CBC: &str = "Complete Blood Count (CBC)";
const URINALYSIS: &str = "Urinalysis";
const BMP: &str = "Basic Metabolic Panel";

/// Deterministic decision tree over a raw patient record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedFallback;

impl RuleBasedFallback {
    pub fn new() -> Self {
        Self
    }

    /// Produce up to three candidates; exactly three when the catalog has at
    /// least three diseases.
    pub fn predict(&self, record: &PatientRecord, catalog: &ReferenceCatalog) -> Vec<Prediction> {
        let temperature = record.vitals.temperature_c;
        let has_cough = record.has_symptom_containing("cough");
        let mut predictions = Vec::with_capacity(FALLBACK_CANDIDATES);

        let mut pneumonia_fired = false;
        match temperature {
            Some(t) if t > PNEUMONIA_TEMP_C && has_cough => {
                predictions.push(pneumonia(t));
                pneumonia_fired = true;
            }
            Some(t) if t > FEVER_TEMP_C => predictions.push(fever(t)),
            _ => {}
        }

        if record.has_symptom_containing("headache") {
            predictions.push(headache());
        } else if has_cough && !pneumonia_fired {
            predictions.push(bronchitis());
        }

        if predictions.is_empty() {
            predictions.push(general_exam());
        }

        for prediction in &mut predictions {
            attach_test_codes(prediction, catalog);
        }

        while predictions.len() < FALLBACK_CANDIDATES {
            let index = predictions.len();
            let Some(entry) = catalog.disease(index) else {
                break;
            };
            predictions.push(Prediction {
                icd10_code: entry.code.clone(),
                diagnosis: entry.description.clone(),
                confidence: differential_confidence(index),
                recommended_tests: Vec::new(),
                recommended_medications: Vec::new(),
                assessment_plan:
                    "Consider as differential diagnosis. Additional evaluation may be needed."
                        .to_string(),
                rationale: vec!["Differential diagnosis consideration".to_string()],
            });
        }

        predictions.truncate(FALLBACK_CANDIDATES);
        tracing::debug!(
            candidates = predictions.len(),
            top = predictions.first().map(|p| p.icd10_code.as_str()).unwrap_or_default(),
            "Fallback prediction"
        );
        predictions
    }
}

/// Confidence for a padded entry at `index`: 0.3 minus 0.1 per slot, floored at 0.1.
fn differential_confidence(index: usize) -> f64 {
    (3_i64 - index as i64).max(1) as f64 / 10.0
}

fn attach_test_codes(prediction: &mut Prediction, catalog: &ReferenceCatalog) {
    for test in &mut prediction.recommended_tests {
        if let Some(entry) = catalog.test_by_name(&test.test) {
            test.test_code = Some(entry.code.clone());
        }
    }
}

/// Render a temperature the way clinicians read it back ("38.2", "39.0").
fn format_temperature(t: f64) -> String {
    if t.fract() == 0.0 {
        format!("{:.1}", t)
    } else {
        t.to_string()
    }
}

fn pneumonia(t: f64) -> Prediction {
    Prediction {
        icd10_code: "J18.9".to_string(),
        diagnosis: "Pneumonia, unspecified organism".to_string(),
        confidence: 0.82,
        recommended_tests: vec![
            TestRecommendation::routine(CHEST_XRAY, 0.9),
            TestRecommendation::routine(CBC, 0.8),
        ],
        recommended_medications: vec![MedicationRecommendation::new(
            "Amoxicillin-clavulanate",
            0.78,
            "500 mg PO TID",
            "7-10 days",
        )],
        assessment_plan: "Likely community-acquired pneumonia. Obtain chest x-ray and CBC; start empiric oral antibiotics considering allergy history. Re-evaluate in 48 hours.".to_string(),
        rationale: vec![
            format!("Fever ({}°C)", format_temperature(t)),
            "Productive cough reported".to_string(),
            "Clinical presentation consistent with respiratory infection".to_string(),
        ],
    }
}

fn fever(t: f64) -> Prediction {
    Prediction {
        icd10_code: "R50.9".to_string(),
        diagnosis: "Fever, unspecified".to_string(),
        confidence: 0.65,
        recommended_tests: vec![
            TestRecommendation::routine(CBC, 0.8),
            TestRecommendation::routine(URINALYSIS, 0.6),
        ],
        recommended_medications: vec![MedicationRecommendation::new(
            "Acetaminophen",
            0.9,
            "650 mg PO q6h PRN",
            "As needed",
        )],
        assessment_plan: "Fever of unknown origin. Supportive care and symptomatic treatment. Monitor for additional symptoms.".to_string(),
        rationale: vec![
            format!("Elevated temperature ({}°C)", format_temperature(t)),
            "No clear source identified".to_string(),
        ],
    }
}

fn headache() -> Prediction {
    Prediction {
        icd10_code: "R51".to_string(),
        diagnosis: "Headache".to_string(),
        confidence: 0.70,
        recommended_tests: vec![TestRecommendation::routine(BMP, 0.5)],
        recommended_medications: vec![MedicationRecommendation::new(
            "Ibuprofen",
            0.85,
            "400 mg PO q6h PRN",
            "As needed",
        )],
        assessment_plan: "Primary headache. Symptomatic treatment with NSAIDs. Consider neurological evaluation if persistent or severe.".to_string(),
        rationale: vec!["Patient reports headache".to_string()],
    }
}

fn bronchitis() -> Prediction {
    Prediction {
        icd10_code: "J40".to_string(),
        diagnosis: "Bronchitis, not specified as acute or chronic".to_string(),
        confidence: 0.68,
        recommended_tests: vec![TestRecommendation::routine(CHEST_XRAY, 0.7)],
        recommended_medications: vec![MedicationRecommendation::new(
            "Dextromethorphan",
            0.75,
            "15 mg PO q4h PRN",
            "As needed for cough",
        )],
        assessment_plan: "Bronchitis, likely viral etiology. Supportive care with cough suppressants. Monitor for bacterial superinfection.".to_string(),
        rationale: vec!["Cough without fever suggests viral bronchitis".to_string()],
    }
}

fn general_exam() -> Prediction {
    Prediction {
        icd10_code: "Z00.00".to_string(),
        diagnosis: "Encounter for general adult medical examination without abnormal findings"
            .to_string(),
        confidence: 0.40,
        recommended_tests: vec![TestRecommendation::routine(CBC, 0.6)],
        recommended_medications: Vec::new(),
        assessment_plan: "Non-specific symptoms. Recommend follow-up if symptoms persist or worsen. Consider routine health maintenance.".to_string(),
        rationale: vec!["Non-specific clinical presentation".to_string()],
    }
}
