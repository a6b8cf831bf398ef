//! Predictor context.
//!
//! Built once at startup from a `PredictorConfig` and then shared read-only
//! by every request. The model load outcome is decided here and never
//! re-checked: a missing or incompatible artifact pins the predictor to the
//! rule-based fallback for its lifetime.

mod assembler;
mod fallback;

pub use assembler::PredictionAssembler;
pub use fallback::{RuleBasedFallback, FALLBACK_CANDIDATES};

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSizes, CatalogSource, ReferenceCatalog};
use crate::config::PredictorConfig;
use crate::encoder::{DimensionReconciler, FeatureEncoder, FeatureVector, WidthAdjustment};
use crate::models::{PatientRecord, Prediction, PredictionMode, PredictionReport};
use crate::scoring::{
    ModelLoad, ScoringError, ScoringModel, ScoringResult, TopKSelector, TEST_CONFIDENCE_FLOOR,
};

/// Reported model version when running on the rule-based fallback.
pub const FALLBACK_MODEL_VERSION: &str = "rule-based";

enum Engine {
    Scored {
        model: Arc<dyn ScoringModel>,
        reconciler: DimensionReconciler,
    },
    Fallback {
        reason: String,
    },
}

/// Snapshot of how the predictor was initialised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictorStatus {
    pub mode: PredictionMode,
    pub model_version: String,
    /// Input width declared by the loaded model
    pub model_input_width: Option<usize>,
    pub encoder_width: usize,
    pub catalog_version: String,
    pub catalog_source: CatalogSource,
    pub catalog_sizes: CatalogSizes,
    /// RFC 3339 timestamp
    pub initialised_at: String,
    /// Why the model is not loaded, in fallback mode
    pub unavailable_reason: Option<String>,
}

/// Owned, immutable prediction context.
pub struct Predictor {
    encoder: FeatureEncoder,
    catalog: ReferenceCatalog,
    engine: Engine,
    selector: TopKSelector,
    assembler: PredictionAssembler,
    fallback: RuleBasedFallback,
    initialised_at: String,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("mode", &self.mode())
            .field("catalog_version", &self.catalog.version())
            .finish()
    }
}

impl Predictor {
    /// Load the catalog and model named by `config`. Never fails; every
    /// load problem degrades to the embedded catalog or the fallback engine.
    pub fn initialise(config: &PredictorConfig) -> Self {
        let catalog = ReferenceCatalog::load(config.catalog_db());
        let load = ModelLoad::from_path(&config.artifact_path(), &catalog);
        Self::new(catalog, load)
    }

    /// Build from an already-loaded catalog and model outcome.
    pub fn new(catalog: ReferenceCatalog, load: ModelLoad) -> Self {
        Self::with_encoder(FeatureEncoder::default(), catalog, load)
    }

    pub fn with_encoder(encoder: FeatureEncoder, catalog: ReferenceCatalog, load: ModelLoad) -> Self {
        let engine = match load {
            ModelLoad::Loaded { model, input_width } => {
                if input_width != encoder.width() {
                    tracing::warn!(
                        encoder_width = encoder.width(),
                        model_width = input_width,
                        "Encoder and model widths differ, inputs will be reconciled"
                    );
                }
                Engine::Scored {
                    model,
                    reconciler: DimensionReconciler::new(input_width),
                }
            }
            ModelLoad::Unavailable(reason) => {
                tracing::info!(reason = %reason, "Predictor running in fallback mode");
                Engine::Fallback { reason }
            }
        };

        Self {
            encoder,
            catalog,
            engine,
            selector: TopKSelector::default(),
            assembler: PredictionAssembler::new(),
            fallback: RuleBasedFallback::new(),
            initialised_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn mode(&self) -> PredictionMode {
        match self.engine {
            Engine::Scored { .. } => PredictionMode::Model,
            Engine::Fallback { .. } => PredictionMode::Fallback,
        }
    }

    pub fn model_version(&self) -> &str {
        match &self.engine {
            Engine::Scored { model, .. } => model.version(),
            Engine::Fallback { .. } => FALLBACK_MODEL_VERSION,
        }
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Encode a record without scoring it.
    pub fn encode(&self, record: &PatientRecord) -> FeatureVector {
        self.encoder.encode(record)
    }

    /// Ranked candidates for a record. Never fails: scoring errors become a
    /// single low-confidence candidate.
    pub fn predict(&self, record: &PatientRecord) -> Vec<Prediction> {
        self.run(record).0
    }

    /// Predict and wrap the result with request metadata. Any width
    /// reconciliation applied to the features is listed in the warnings.
    pub fn report(&self, record: &PatientRecord) -> PredictionReport {
        let started = Instant::now();
        let (predictions, adjustment) = self.run(record);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let mut report = PredictionReport::new(
            predictions,
            self.mode(),
            self.model_version(),
            elapsed_ms,
            TEST_CONFIDENCE_FLOOR,
        );
        if let Some(note) = adjustment.note() {
            report.clinical_warnings.push(note);
        }
        tracing::debug!(
            request_id = %report.request_id,
            candidates = report.predictions.len(),
            elapsed_ms,
            "Prediction complete"
        );
        report
    }

    pub fn status(&self) -> PredictorStatus {
        let (model_input_width, unavailable_reason) = match &self.engine {
            Engine::Scored { reconciler, .. } => (Some(reconciler.expected_width()), None),
            Engine::Fallback { reason } => (None, Some(reason.clone())),
        };

        PredictorStatus {
            mode: self.mode(),
            model_version: self.model_version().to_string(),
            model_input_width,
            encoder_width: self.encoder.width(),
            catalog_version: self.catalog.version().to_string(),
            catalog_source: self.catalog.source(),
            catalog_sizes: self.catalog.sizes(),
            initialised_at: self.initialised_at.clone(),
            unavailable_reason,
        }
    }

    fn run(&self, record: &PatientRecord) -> (Vec<Prediction>, WidthAdjustment) {
        match &self.engine {
            Engine::Fallback { .. } => (
                self.fallback.predict(record, &self.catalog),
                WidthAdjustment::Unchanged,
            ),
            Engine::Scored { model, reconciler } => {
                let features = self.encoder.encode(record);
                let (values, adjustment) = reconciler.reconcile(features.into_values());
                let predictions = match self.score(model.as_ref(), &values) {
                    Ok(predictions) => predictions,
                    Err(e) => {
                        tracing::warn!(error = %e, "Scoring failed");
                        vec![Prediction::scoring_failure(&e.to_string())]
                    }
                };
                (predictions, adjustment)
            }
        }
    }

    fn score(&self, model: &dyn ScoringModel, values: &[f32]) -> ScoringResult<Vec<Prediction>> {
        let scores = model.score(values)?;
        let sizes = model.output_sizes();
        if scores.disease.len() != sizes.diseases
            || scores.test.len() != sizes.tests
            || scores.medication.len() != sizes.medications
        {
            return Err(ScoringError::Model(format!(
                "score arrays {}/{}/{} do not match declared sizes {}/{}/{}",
                scores.disease.len(),
                scores.test.len(),
                scores.medication.len(),
                sizes.diseases,
                sizes.tests,
                sizes.medications
            )));
        }

        let selection = self
            .selector
            .select(&scores.disease, &scores.test, &scores.medication);
        let predictions =
            self.assembler
                .assemble(&selection, scores.assessment_confidence, &self.catalog);
        if predictions.is_empty() {
            return Err(ScoringError::Model(
                "no selected disease is present in the catalog".into(),
            ));
        }
        Ok(predictions)
    }
}
