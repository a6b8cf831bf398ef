//! Vocabulary-based encoding of symptom and history term lists.
//!
//! Matching per input term (lowercased, trimmed):
//! - exact match against a vocabulary term → 1.0 in that slot
//! - otherwise the first vocabulary term, in slot order, where either string
//!   contains the other → the vocabulary's partial weight
//!
//! Exact matches are resolved over the whole input before any partial match,
//! and a partial match never lowers a slot, so the output does not depend on
//! input order.

use std::collections::HashMap;

/// Weight written for an exact term match.
pub const EXACT_MATCH_WEIGHT: f32 = 1.0;

/// Partial-match weight for the symptom vocabulary.
pub const SYMPTOM_PARTIAL_WEIGHT: f32 = 0.7;

/// Partial-match weight for the history vocabulary.
pub const HISTORY_PARTIAL_WEIGHT: f32 = 0.8;

const SYMPTOM_TERMS: [&str; 30] = [
    "fever",
    "cough",
    "fatigue",
    "headache",
    "nausea",
    "vomiting",
    "diarrhea",
    "constipation",
    "chest pain",
    "abdominal pain",
    "shortness of breath",
    "dizziness",
    "weakness",
    "joint pain",
    "muscle pain",
    "sore throat",
    "runny nose",
    "congestion",
    "rash",
    "itching",
    "swelling",
    "difficulty swallowing",
    "productive cough",
    "dry cough",
    "night sweats",
    "chills",
    "loss of appetite",
    "weight loss",
    "weight gain",
    "insomnia",
];

const HISTORY_TERMS: [&str; 20] = [
    "hypertension",
    "diabetes",
    "heart disease",
    "asthma",
    "copd",
    "cancer",
    "stroke",
    "kidney disease",
    "liver disease",
    "arthritis",
    "depression",
    "anxiety",
    "thyroid disorder",
    "high cholesterol",
    "obesity",
    "osteoporosis",
    "allergies",
    "migraines",
    "sleep apnea",
    "gastroesophageal reflux",
];

/// Immutable ordered term → slot mapping.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Vec<String>,
    slots: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary; slots follow the given order. Terms are lowercased
    /// and trimmed, and blanks or repeats are dropped.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered = Vec::new();
        let mut slots = HashMap::new();
        for term in terms {
            let term = clean_term(term.as_ref());
            if term.is_empty() || slots.contains_key(&term) {
                continue;
            }
            slots.insert(term.clone(), ordered.len());
            ordered.push(term);
        }
        Self {
            terms: ordered,
            slots,
        }
    }

    /// Default symptom vocabulary.
    pub fn symptoms() -> Self {
        Self::new(SYMPTOM_TERMS)
    }

    /// Default past-medical-history vocabulary.
    pub fn history() -> Self {
        Self::new(HISTORY_TERMS)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in slot order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Slot of an exact (already cleaned) term.
    pub fn slot(&self, term: &str) -> Option<usize> {
        self.slots.get(term).copied()
    }

    /// First slot, in slot order, whose term contains or is contained in `term`.
    pub fn partial_slot(&self, term: &str) -> Option<usize> {
        self.terms
            .iter()
            .position(|vocab| vocab.contains(term) || term.contains(vocab.as_str()))
    }
}

/// Weighted indicator encoder over one vocabulary.
#[derive(Debug, Clone)]
pub struct VocabularyEncoder {
    vocabulary: Vocabulary,
    partial_weight: f32,
}

impl VocabularyEncoder {
    pub fn new(vocabulary: Vocabulary, partial_weight: f32) -> Self {
        Self {
            vocabulary,
            partial_weight,
        }
    }

    /// Encoder for the default symptom vocabulary.
    pub fn symptoms() -> Self {
        Self::new(Vocabulary::symptoms(), SYMPTOM_PARTIAL_WEIGHT)
    }

    /// Encoder for the default history vocabulary.
    pub fn history() -> Self {
        Self::new(Vocabulary::history(), HISTORY_PARTIAL_WEIGHT)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Output width.
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Encode a term list into a vector of vocabulary width.
    pub fn encode<S: AsRef<str>>(&self, terms: &[S]) -> Vec<f32> {
        let mut encoded = vec![0.0; self.width()];
        let mut unmatched = Vec::new();

        for term in terms {
            let term = clean_term(term.as_ref());
            if term.is_empty() {
                continue;
            }
            match self.vocabulary.slot(&term) {
                Some(slot) => encoded[slot] = EXACT_MATCH_WEIGHT,
                None => unmatched.push(term),
            }
        }

        for term in &unmatched {
            if let Some(slot) = self.vocabulary.partial_slot(term) {
                encoded[slot] = encoded[slot].max(self.partial_weight);
            }
        }

        encoded
    }
}

fn clean_term(term: &str) -> String {
    term.trim().to_lowercase()
}
