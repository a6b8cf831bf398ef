//! Builds predictions from scored selections.

use crate::catalog::ReferenceCatalog;
use crate::models::{MedicationRecommendation, Prediction, TestRecommendation};
use crate::scoring::{Ranked, Selection};

/// Joins selected class indices with catalog descriptors. Pure; no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionAssembler;

impl PredictionAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Build one prediction per selected disease present in the catalog.
    ///
    /// Tests and medications are shared by every candidate.
    pub fn assemble(
        &self,
        selection: &Selection,
        assessment_confidence: f64,
        catalog: &ReferenceCatalog,
    ) -> Vec<Prediction> {
        let tests = self.tests(&selection.tests, catalog);
        let medications = self.medications(&selection.medications, catalog);

        selection
            .diseases
            .iter()
            .filter_map(|ranked| {
                let Some(entry) = catalog.disease(ranked.index) else {
                    tracing::warn!(index = ranked.index, "Disease index missing from catalog");
                    return None;
                };
                let confidence = ranked.score.clamp(0.0, 1.0);
                Some(Prediction {
                    icd10_code: entry.code.clone(),
                    diagnosis: entry.description.clone(),
                    confidence,
                    recommended_tests: tests.clone(),
                    recommended_medications: medications.clone(),
                    assessment_plan: format!(
                        "ML model suggests {}. Confidence: {:.2}. Recommend appropriate diagnostic workup and treatment based on clinical context.",
                        entry.description.to_lowercase(),
                        confidence
                    ),
                    rationale: vec![
                        "ML model prediction based on clinical features".to_string(),
                        format!("Model confidence: {:.3}", confidence),
                        format!("Assessment confidence: {:.3}", assessment_confidence),
                    ],
                })
            })
            .collect()
    }

    fn tests(&self, ranked: &[Ranked], catalog: &ReferenceCatalog) -> Vec<TestRecommendation> {
        ranked
            .iter()
            .filter_map(|r| {
                catalog.test(r.index).map(|entry| TestRecommendation {
                    test: entry.name.clone(),
                    test_code: Some(entry.code.clone()),
                    confidence: r.score.clamp(0.0, 1.0),
                    urgency: "routine".to_string(),
                })
            })
            .collect()
    }

    fn medications(
        &self,
        ranked: &[Ranked],
        catalog: &ReferenceCatalog,
    ) -> Vec<MedicationRecommendation> {
        ranked
            .iter()
            .filter_map(|r| {
                catalog.medication(r.index).map(|entry| MedicationRecommendation {
                    medication: entry.name.clone(),
                    confidence: r.score.clamp(0.0, 1.0),
                    dose_suggestion: Some(entry.typical_dosage.clone()),
                    duration: None,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(index: usize, score: f64) -> Ranked {
        Ranked { index, score }
    }

    #[test]
    fn test_assemble_shares_recommendations() {
        let catalog = ReferenceCatalog::embedded();
        let selection = Selection {
            diseases: vec![ranked(0, 0.6), ranked(2, 0.3)],
            tests: vec![ranked(1, 0.9)],
            medications: vec![ranked(2, 0.4), ranked(0, 0.1)],
        };

        let predictions = PredictionAssembler::new().assemble(&selection, 0.75, &catalog);
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].icd10_code, "J18.9");
        assert_eq!(
            predictions[0].assessment_plan,
            "ML model suggests pneumonia, unspecified organism. Confidence: 0.60. Recommend appropriate diagnostic workup and treatment based on clinical context."
        );
        assert_eq!(
            predictions[0].rationale,
            vec![
                "ML model prediction based on clinical features",
                "Model confidence: 0.600",
                "Assessment confidence: 0.750"
            ]
        );
        assert_eq!(predictions[0].recommended_tests, predictions[1].recommended_tests);
        assert_eq!(predictions[1].recommended_tests[0].test, "Chest X-ray (PA/AP)");
        assert_eq!(predictions[1].recommended_tests[0].test_code.as_deref(), Some("71020"));
        assert_eq!(predictions[1].recommended_medications[0].medication, "Amoxicillin");
        assert_eq!(
            predictions[1].recommended_medications[0].dose_suggestion.as_deref(),
            Some("500 mg PO TID")
        );
    }

    #[test]
    fn test_unknown_indices_skipped() {
        let catalog = ReferenceCatalog::embedded();
        let selection = Selection {
            diseases: vec![ranked(9, 0.9), ranked(1, 0.1)],
            tests: vec![ranked(7, 0.9)],
            medications: Vec::new(),
        };
        let predictions = PredictionAssembler::new().assemble(&selection, 0.5, &catalog);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].icd10_code, "R50.9");
        assert!(predictions[0].recommended_tests.is_empty());
    }
}
