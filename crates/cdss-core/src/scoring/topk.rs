//! Deterministic top-k selection over score arrays.

use std::cmp::Ordering;

/// Disease candidates returned per request.
pub const DISEASE_TOP_K: usize = 3;

/// Maximum test recommendations.
pub const TEST_TOP_K: usize = 3;

/// Minimum score for a test recommendation.
pub const TEST_CONFIDENCE_FLOOR: f64 = 0.5;

/// Maximum medication recommendations.
pub const MEDICATION_TOP_K: usize = 2;

/// A selected class index and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub index: usize,
    pub score: f64,
}

/// Selections for one request. Tests and medications are selected once and
/// shared by every disease candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub diseases: Vec<Ranked>,
    pub tests: Vec<Ranked>,
    pub medications: Vec<Ranked>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopKSelector {
    pub disease_k: usize,
    pub test_k: usize,
    pub test_floor: f64,
    pub medication_k: usize,
}

impl Default for TopKSelector {
    fn default() -> Self {
        Self {
            disease_k: DISEASE_TOP_K,
            test_k: TEST_TOP_K,
            test_floor: TEST_CONFIDENCE_FLOOR,
            medication_k: MEDICATION_TOP_K,
        }
    }
}

impl TopKSelector {
    pub fn select(&self, disease: &[f64], test: &[f64], medication: &[f64]) -> Selection {
        Selection {
            diseases: top_k(disease, self.disease_k, None),
            tests: top_k(test, self.test_k, Some(self.test_floor)),
            medications: top_k(medication, self.medication_k, None),
        }
    }
}

/// Top `k` entries by descending score, ties to the lower index.
///
/// Non-finite scores are never selected.
pub fn top_k(scores: &[f64], k: usize, floor: Option<f64>) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = scores
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .filter(|(_, s)| floor.map_or(true, |f| **s >= f))
        .map(|(index, &score)| Ranked { index, score })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    ranked.truncate(k);
    ranked
}
