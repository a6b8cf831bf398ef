//! Feature vector assembly.
//!
//! Segment order is frozen: vitals, symptoms, history, text keywords.
//! Fitted artifacts depend on it.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::keywords::KeywordExtractor;
use super::vitals::{VitalsNormalizer, VITALS_FEATURE_NAMES, VITALS_WIDTH};
use super::vocabulary::VocabularyEncoder;
use crate::models::PatientRecord;

/// Segment widths of an encoder configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureLayout {
    pub vitals: usize,
    pub symptoms: usize,
    pub history: usize,
    pub keywords: usize,
}

impl FeatureLayout {
    /// Total vector width.
    pub fn width(&self) -> usize {
        self.vitals + self.symptoms + self.history + self.keywords
    }

    pub fn vitals_range(&self) -> Range<usize> {
        0..self.vitals
    }

    pub fn symptoms_range(&self) -> Range<usize> {
        let start = self.vitals;
        start..start + self.symptoms
    }

    pub fn history_range(&self) -> Range<usize> {
        let start = self.vitals + self.symptoms;
        start..start + self.history
    }

    pub fn keywords_range(&self) -> Range<usize> {
        let start = self.vitals + self.symptoms + self.history;
        start..start + self.keywords
    }
}

/// An assembled, not yet reconciled, feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
    layout: FeatureLayout,
}

impl FeatureVector {
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    pub fn vitals(&self) -> &[f32] {
        &self.values[self.layout.vitals_range()]
    }

    pub fn symptoms(&self) -> &[f32] {
        &self.values[self.layout.symptoms_range()]
    }

    pub fn history(&self) -> &[f32] {
        &self.values[self.layout.history_range()]
    }

    pub fn keywords(&self) -> &[f32] {
        &self.values[self.layout.keywords_range()]
    }
}

/// Encodes a patient record into a flat feature vector.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    vitals: VitalsNormalizer,
    symptoms: VocabularyEncoder,
    history: VocabularyEncoder,
    keywords: KeywordExtractor,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(
            VocabularyEncoder::symptoms(),
            VocabularyEncoder::history(),
            KeywordExtractor::default(),
        )
    }
}

impl FeatureEncoder {
    pub fn new(
        symptoms: VocabularyEncoder,
        history: VocabularyEncoder,
        keywords: KeywordExtractor,
    ) -> Self {
        Self {
            vitals: VitalsNormalizer::new(),
            symptoms,
            history,
            keywords,
        }
    }

    pub fn layout(&self) -> FeatureLayout {
        FeatureLayout {
            vitals: VITALS_WIDTH,
            symptoms: self.symptoms.width(),
            history: self.history.width(),
            keywords: self.keywords.width(),
        }
    }

    pub fn width(&self) -> usize {
        self.layout().width()
    }

    /// Encode a record. Total over any input.
    pub fn encode(&self, record: &PatientRecord) -> FeatureVector {
        let layout = self.layout();
        let mut values = Vec::with_capacity(layout.width());

        values.extend_from_slice(&self.vitals.normalize(record));
        values.extend(self.symptoms.encode(&record.symptom_list));
        values.extend(self.history.encode(&record.pmh_list));
        values.extend(self.keywords.extract(&record.clinical_text()));

        FeatureVector { values, layout }
    }

    /// Names of every slot, in vector order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = VITALS_FEATURE_NAMES.iter().map(|n| n.to_string()).collect();
        names.extend(
            self.symptoms
                .vocabulary()
                .terms()
                .iter()
                .map(|t| format!("symptom_{}", t)),
        );
        names.extend(
            self.history
                .vocabulary()
                .terms()
                .iter()
                .map(|t| format!("pmh_{}", t)),
        );
        names.extend(self.keywords.keywords().iter().map(|k| format!("text_{}", k)));
        names
    }
}
