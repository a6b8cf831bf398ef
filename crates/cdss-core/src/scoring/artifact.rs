//! JSON scoring artifacts.
//!
//! An artifact is a small dense network: optional shared ReLU layers feeding
//! four heads (disease softmax, test sigmoid, medication sigmoid, assessment
//! sigmoid of width 1). It is written by the offline fitting job and loaded
//! once at startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{OutputSizes, ScoringError, ScoringModel, ScoringResult, TaskScores};
use crate::catalog::ReferenceCatalog;

/// Artifact format understood by this loader.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Artifact loading errors.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported artifact format {0}")]
    UnsupportedFormat(u32),

    #[error("Malformed artifact: {0}")]
    Shape(String),

    #[error("Catalog version mismatch: artifact {artifact}, catalog {catalog}")]
    CatalogMismatch { artifact: String, catalog: String },

    #[error("{table} cardinality mismatch: artifact {artifact}, catalog {catalog}")]
    Cardinality {
        table: &'static str,
        artifact: usize,
        catalog: usize,
    },
}

/// One fully connected layer; `weights` is `[out][in]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl DenseLayer {
    pub fn input_width(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    pub fn output_width(&self) -> usize {
        self.weights.len()
    }

    fn check(&self, name: &str, input_width: usize) -> Result<(), ArtifactError> {
        if self.weights.is_empty() {
            return Err(ArtifactError::Shape(format!("{} has no outputs", name)));
        }
        if self.bias.len() != self.weights.len() {
            return Err(ArtifactError::Shape(format!(
                "{} has {} rows but {} biases",
                name,
                self.weights.len(),
                self.bias.len()
            )));
        }
        if let Some(row) = self.weights.iter().find(|row| row.len() != input_width) {
            return Err(ArtifactError::Shape(format!(
                "{} row width {}, expected {}",
                name,
                row.len(),
                input_width
            )));
        }
        Ok(())
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                row.iter()
                    .zip(input)
                    .fold(*bias as f64, |acc, (w, x)| acc + *w as f64 * x)
            })
            .collect()
    }
}

/// Serialized artifact layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactFile {
    pub format_version: u32,
    pub model_version: String,
    /// Catalog snapshot the heads were fitted against
    #[serde(default)]
    pub catalog_version: Option<String>,
    pub input_width: usize,
    #[serde(default)]
    pub hidden: Vec<DenseLayer>,
    pub disease_head: DenseLayer,
    pub test_head: DenseLayer,
    pub medication_head: DenseLayer,
    pub assessment_head: DenseLayer,
}

/// A validated artifact ready for scoring.
#[derive(Debug, Clone)]
pub struct ArtifactModel {
    file: ArtifactFile,
}

impl TryFrom<ArtifactFile> for ArtifactModel {
    type Error = ArtifactError;

    fn try_from(file: ArtifactFile) -> Result<Self, Self::Error> {
        if file.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedFormat(file.format_version));
        }
        if file.input_width == 0 {
            return Err(ArtifactError::Shape("input_width is zero".into()));
        }

        let mut width = file.input_width;
        for (i, layer) in file.hidden.iter().enumerate() {
            layer.check(&format!("hidden layer {}", i), width)?;
            width = layer.output_width();
        }
        file.disease_head.check("disease head", width)?;
        file.test_head.check("test head", width)?;
        file.medication_head.check("medication head", width)?;
        file.assessment_head.check("assessment head", width)?;
        if file.assessment_head.output_width() != 1 {
            return Err(ArtifactError::Shape(format!(
                "assessment head width {}, expected 1",
                file.assessment_head.output_width()
            )));
        }

        Ok(Self { file })
    }
}

impl ArtifactModel {
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let file: ArtifactFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn catalog_version(&self) -> Option<&str> {
        self.file.catalog_version.as_deref()
    }

    pub fn file(&self) -> &ArtifactFile {
        &self.file
    }
}

impl ScoringModel for ArtifactModel {
    fn input_width(&self) -> usize {
        self.file.input_width
    }

    fn output_sizes(&self) -> OutputSizes {
        OutputSizes {
            diseases: self.file.disease_head.output_width(),
            tests: self.file.test_head.output_width(),
            medications: self.file.medication_head.output_width(),
        }
    }

    fn version(&self) -> &str {
        &self.file.model_version
    }

    fn score(&self, features: &[f32]) -> ScoringResult<TaskScores> {
        if features.len() != self.file.input_width {
            return Err(ScoringError::InputWidth {
                expected: self.file.input_width,
                actual: features.len(),
            });
        }

        let mut shared: Vec<f64> = features.iter().map(|x| *x as f64).collect();
        for layer in &self.file.hidden {
            shared = layer.forward(&shared).into_iter().map(relu).collect();
        }

        let disease = softmax(&self.file.disease_head.forward(&shared));
        let test: Vec<f64> = self.file.test_head.forward(&shared).into_iter().map(sigmoid).collect();
        let medication: Vec<f64> = self
            .file
            .medication_head
            .forward(&shared)
            .into_iter()
            .map(sigmoid)
            .collect();
        let assessment_confidence = self
            .file
            .assessment_head
            .forward(&shared)
            .first()
            .copied()
            .map(sigmoid)
            .unwrap_or_default();

        ensure_finite("disease", &disease)?;
        ensure_finite("test", &test)?;
        ensure_finite("medication", &medication)?;
        ensure_finite("assessment", &[assessment_confidence])?;

        Ok(TaskScores {
            disease,
            test,
            medication,
            assessment_confidence,
        })
    }
}

/// Outcome of loading a scoring model at startup.
#[derive(Clone)]
pub enum ModelLoad {
    Loaded {
        model: Arc<dyn ScoringModel>,
        input_width: usize,
    },
    Unavailable(String),
}

impl std::fmt::Debug for ModelLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelLoad::Loaded { model, input_width } => f
                .debug_struct("Loaded")
                .field("version", &model.version())
                .field("input_width", input_width)
                .finish(),
            ModelLoad::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

impl ModelLoad {
    /// Wrap an already-built model.
    pub fn loaded(model: Arc<dyn ScoringModel>) -> Self {
        let input_width = model.input_width();
        ModelLoad::Loaded { model, input_width }
    }

    /// Load the artifact at `path` and check it against `catalog`.
    pub fn from_path(path: &Path, catalog: &ReferenceCatalog) -> Self {
        if !path.exists() {
            let reason = format!("Model artifact not found: {}", path.display());
            tracing::warn!(path = %path.display(), "Model artifact not found, using rule-based fallback");
            return ModelLoad::Unavailable(reason);
        }

        let checked = ArtifactModel::from_path(path).and_then(|model| {
            ensure_compatible(model.catalog_version(), model.output_sizes(), catalog)?;
            Ok(model)
        });

        match checked {
            Ok(model) => {
                tracing::info!(
                    path = %path.display(),
                    version = %model.version(),
                    input_width = model.input_width(),
                    "Loaded scoring model"
                );
                Self::loaded(Arc::new(model))
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Scoring model unavailable, using rule-based fallback"
                );
                ModelLoad::Unavailable(e.to_string())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelLoad::Loaded { .. })
    }
}

/// Artifact file for a model version inside `model_dir`.
pub fn artifact_path(model_dir: &Path, model_version: &str) -> PathBuf {
    model_dir.join(format!("clinical_model_{}.json", model_version))
}

/// Refuse artifacts fitted against a different catalog enumeration.
///
/// A declared catalog version must match exactly, and the head
/// cardinalities must always equal the catalog table sizes.
pub fn ensure_compatible(
    catalog_version: Option<&str>,
    sizes: OutputSizes,
    catalog: &ReferenceCatalog,
) -> Result<(), ArtifactError> {
    if let Some(version) = catalog_version {
        if version != catalog.version() {
            return Err(ArtifactError::CatalogMismatch {
                artifact: version.to_string(),
                catalog: catalog.version().to_string(),
            });
        }
    }

    let catalog_sizes = catalog.sizes();
    let pairs = [
        ("disease", sizes.diseases, catalog_sizes.diseases),
        ("test", sizes.tests, catalog_sizes.tests),
        ("medication", sizes.medications, catalog_sizes.medications),
    ];
    for (table, artifact, catalog) in pairs {
        if artifact != catalog {
            return Err(ArtifactError::Cardinality {
                table,
                artifact,
                catalog,
            });
        }
    }
    Ok(())
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn ensure_finite(head: &'static str, values: &[f64]) -> ScoringResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ScoringError::NonFinite(head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(rows: usize, cols: usize, value: f32) -> DenseLayer {
        DenseLayer {
            weights: vec![vec![value; cols]; rows],
            bias: vec![0.0; rows],
        }
    }

    fn artifact(input_width: usize) -> ArtifactFile {
        let catalog = ReferenceCatalog::embedded();
        let sizes = catalog.sizes();
        ArtifactFile {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_version: "v1.0".into(),
            catalog_version: Some(catalog.version().to_string()),
            input_width,
            hidden: vec![layer(4, input_width, 0.1)],
            disease_head: layer(sizes.diseases, 4, 0.0),
            test_head: layer(sizes.tests, 4, 0.0),
            medication_head: layer(sizes.medications, 4, 0.0),
            assessment_head: layer(1, 4, 0.0),
        }
    }

    #[test]
    fn test_score_shapes() {
        let model = ArtifactModel::try_from(artifact(8)).unwrap();
        let scores = model.score(&[1.0; 8]).unwrap();

        assert_eq!(scores.disease.len(), 4);
        assert!((scores.disease.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // zero weights: uniform softmax, sigmoid(0) elsewhere
        assert!((scores.disease[0] - 0.25).abs() < 1e-9);
        assert!(scores.test.iter().all(|s| (s - 0.5).abs() < 1e-9));
        assert!((scores.assessment_confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_input_width() {
        let model = ArtifactModel::try_from(artifact(8)).unwrap();
        assert_eq!(
            model.score(&[0.0; 7]).unwrap_err(),
            ScoringError::InputWidth {
                expected: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn test_disease_head_ranks() {
        let sizes = ReferenceCatalog::embedded().sizes();
        let mut file = artifact(2);
        file.hidden.clear();
        file.disease_head = DenseLayer {
            weights: vec![vec![0.0, 0.0]; 4],
            bias: vec![0.0, 2.0, 1.0, 0.0],
        };
        file.test_head = layer(sizes.tests, 2, 0.0);
        file.medication_head = layer(sizes.medications, 2, 0.0);
        file.assessment_head = layer(1, 2, 0.0);
        let model = ArtifactModel::try_from(file).unwrap();
        let scores = model.score(&[0.0, 0.0]).unwrap();
        assert!(scores.disease[1] > scores.disease[2]);
        assert!(scores.disease[2] > scores.disease[0]);
    }

    #[test]
    fn test_shape_validation() {
        let mut file = artifact(8);
        file.test_head.bias.pop();
        assert!(matches!(
            ArtifactModel::try_from(file),
            Err(ArtifactError::Shape(_))
        ));

        let mut file = artifact(8);
        file.assessment_head = layer(2, 4, 0.0);
        assert!(matches!(
            ArtifactModel::try_from(file),
            Err(ArtifactError::Shape(_))
        ));

        let mut file = artifact(8);
        file.format_version = 2;
        assert!(matches!(
            ArtifactModel::try_from(file),
            Err(ArtifactError::UnsupportedFormat(2))
        ));
    }

    #[test]
    fn test_catalog_compatibility() {
        let catalog = ReferenceCatalog::embedded();
        let sizes = OutputSizes {
            diseases: 4,
            tests: 3,
            medications: 3,
        };
        assert!(ensure_compatible(Some(catalog.version()), sizes, &catalog).is_ok());
        assert!(ensure_compatible(None, sizes, &catalog).is_ok());
        assert!(matches!(
            ensure_compatible(Some("stale"), sizes, &catalog),
            Err(ArtifactError::CatalogMismatch { .. })
        ));
        assert!(matches!(
            ensure_compatible(None, OutputSizes { diseases: 5, ..sizes }, &catalog),
            Err(ArtifactError::Cardinality { table: "disease", .. })
        ));
        // a matching version does not excuse wider heads
        assert!(matches!(
            ensure_compatible(
                Some(catalog.version()),
                OutputSizes { diseases: 10, ..sizes },
                &catalog
            ),
            Err(ArtifactError::Cardinality {
                table: "disease",
                artifact: 10,
                catalog: 4
            })
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let catalog = ReferenceCatalog::embedded();
        let dir = tempfile::tempdir().unwrap();
        let path = artifact_path(dir.path(), "v1.0");
        assert!(path.ends_with("clinical_model_v1.0.json"));

        assert!(matches!(
            ModelLoad::from_path(&path, &catalog),
            ModelLoad::Unavailable(_)
        ));

        fs::write(&path, serde_json::to_string(&artifact(106)).unwrap()).unwrap();
        match ModelLoad::from_path(&path, &catalog) {
            ModelLoad::Loaded { input_width, model } => {
                assert_eq!(input_width, 106);
                assert_eq!(model.version(), "v1.0");
            }
            other => panic!("expected loaded model, got {:?}", other),
        }

        fs::write(&path, "{ not json").unwrap();
        assert!(!ModelLoad::from_path(&path, &catalog).is_loaded());
    }
}
