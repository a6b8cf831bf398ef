//! Patient record → feature vector encoding.
//!
//! Pipeline:
//! 1. Normalize demographics and vitals
//! 2. Encode symptom and history term lists against fixed vocabularies
//! 3. Count clinical keywords in the free text
//! 4. Concatenate in the frozen segment order
//! 5. Reconcile the width against the loaded artifact

mod assembler;
mod keywords;
mod reconcile;
mod vitals;
mod vocabulary;

pub use assembler::{FeatureEncoder, FeatureLayout, FeatureVector};
pub use keywords::{KeywordExtractor, CLINICAL_KEYWORDS, KEYWORD_SATURATION};
pub use reconcile::{DimensionReconciler, WidthAdjustment};
pub use vitals::{VitalsNormalizer, VITALS_FEATURE_NAMES, VITALS_WIDTH};
pub use vocabulary::{
    Vocabulary, VocabularyEncoder, EXACT_MATCH_WEIGHT, HISTORY_PARTIAL_WEIGHT,
    SYMPTOM_PARTIAL_WEIGHT,
};

/// Feature width of the layout used by older artifacts (50 keywords).
pub const LEGACY_FEATURE_WIDTH: usize = 106;
