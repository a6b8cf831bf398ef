//! Scoring models and candidate selection.
//!
//! A `ScoringModel` maps a reconciled feature vector to per-task score
//! arrays indexed like the reference catalog tables.

mod artifact;
mod topk;

pub use artifact::*;
pub use topk::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a scoring call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("input width {actual}, expected {expected}")]
    InputWidth { expected: usize, actual: usize },

    #[error("non-finite score in {0} head")]
    NonFinite(&'static str),

    #[error("{0}")]
    Model(String),
}

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Declared output cardinalities per task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputSizes {
    pub diseases: usize,
    pub tests: usize,
    pub medications: usize,
}

/// Scores for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskScores {
    /// Categorical distribution over diseases
    pub disease: Vec<f64>,
    /// Independent per-test probabilities
    pub test: Vec<f64>,
    /// Independent per-medication probabilities
    pub medication: Vec<f64>,
    pub assessment_confidence: f64,
}

/// A fitted scoring function. Stateless per call.
pub trait ScoringModel: Send + Sync {
    /// Feature width the model was fitted on.
    fn input_width(&self) -> usize;

    fn output_sizes(&self) -> OutputSizes;

    /// Identifier reported alongside predictions.
    fn version(&self) -> &str;

    /// Score a vector of exactly `input_width()` values.
    fn score(&self, features: &[f32]) -> ScoringResult<TaskScores>;
}
