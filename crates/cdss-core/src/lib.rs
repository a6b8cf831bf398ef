//! CDSS Core Library
//!
//! Feature encoding and multi-task prediction for clinical decision support.
//!
//! # Architecture
//!
//! ```text
//! PatientRecord
//!      │
//!      ├──► VitalsNormalizer ─────┐
//!      ├──► Symptom vocabulary ───┤
//!      ├──► History vocabulary ───┼──► FeatureEncoder ──► DimensionReconciler
//!      └──► Keyword extractor ────┘                              │
//!                                                                ▼
//!                                                          ScoringModel
//!                                                                │
//!                                                          TopKSelector
//!                                                                │
//!                       ReferenceCatalog ──────────────► PredictionAssembler
//!                                                                │
//!                                                                ▼
//!                                                         Vec<Prediction>
//! ```
//!
//! Without a loaded model the scored path is skipped and the
//! `RuleBasedFallback` works on the raw record.
//!
//! # Core Principle
//!
//! **Prediction never fails.** Missing artifacts, catalog outages, width drift
//! and scoring errors all degrade to a valid result plus a `tracing` event.
//!
//! # Modules
//!
//! - [`db`]: SQLite reference catalog store
//! - [`catalog`]: Ordered, versioned catalog snapshot
//! - [`models`]: Domain types (PatientRecord, Prediction, catalog entries)
//! - [`encoder`]: Record → feature vector
//! - [`scoring`]: Scoring model seam, JSON artifacts, top-k selection
//! - [`predictor`]: Predictor context and rule-based fallback
//! - [`config`]: Startup configuration

pub mod catalog;
pub mod config;
pub mod db;
pub mod encoder;
pub mod models;
pub mod predictor;
pub mod scoring;

// Re-export commonly used types
pub use catalog::{CatalogSource, ReferenceCatalog};
pub use config::PredictorConfig;
pub use db::Database;
pub use encoder::{FeatureEncoder, FeatureLayout, FeatureVector};
pub use models::{
    MedicationRecommendation, PatientRecord, Prediction, PredictionMode, PredictionReport, Sex,
    TestRecommendation, Vitals,
};
pub use predictor::{Predictor, PredictorStatus};
pub use scoring::{ModelLoad, ScoringModel};

/// Errors from the fallible entry points around the predictor.
#[derive(Debug, thiserror::Error)]
pub enum CdssError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type CdssResult<T> = Result<T, CdssError>;

impl From<db::DbError> for CdssError {
    fn from(e: db::DbError) -> Self {
        CdssError::Database(e.to_string())
    }
}

impl From<catalog::CatalogError> for CdssError {
    fn from(e: catalog::CatalogError) -> Self {
        CdssError::Database(e.to_string())
    }
}

impl From<config::ConfigError> for CdssError {
    fn from(e: config::ConfigError) -> Self {
        CdssError::Config(e.to_string())
    }
}

impl From<models::ValidationError> for CdssError {
    fn from(e: models::ValidationError) -> Self {
        CdssError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for CdssError {
    fn from(e: serde_json::Error) -> Self {
        CdssError::Serialization(e.to_string())
    }
}

/// Parse and validate a JSON patient record at the boundary.
pub fn parse_record(json: &str) -> CdssResult<PatientRecord> {
    let record: PatientRecord = serde_json::from_str(json)?;
    record.validate()?;
    Ok(record)
}
