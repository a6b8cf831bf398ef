//! Predictor integration tests: catalog store, artifacts on disk, scoring.

use std::fs;

use cdss_core::catalog::{CatalogSource, ReferenceCatalog};
use cdss_core::db::Database;
use cdss_core::models::{DiseaseEntry, MedicationEntry, PatientRecord, PredictionMode, Sex, TestEntry};
use cdss_core::scoring::{ArtifactFile, DenseLayer, ARTIFACT_FORMAT_VERSION};
use cdss_core::{Predictor, PredictorConfig};

fn seed_store(db: &Database) {
    for (code, description) in [
        ("J18.9", "Pneumonia, unspecified organism"),
        ("J40", "Bronchitis, not specified as acute or chronic"),
        ("R50.9", "Fever, unspecified"),
        ("R51", "Headache"),
    ] {
        db.upsert_disease(&DiseaseEntry::new(code, description, "General"))
            .unwrap();
    }
    db.upsert_test(&TestEntry::new("Complete Blood Count (CBC)", "85025", "Laboratory"))
        .unwrap();
    db.upsert_test(&TestEntry::new("Chest X-ray (PA/AP)", "71020", "Imaging"))
        .unwrap();
    db.upsert_medication(&MedicationEntry::new("Acetaminophen", "Analgesic", "650 mg PO q6h PRN"))
        .unwrap();
    db.upsert_medication(&MedicationEntry::new("Ibuprofen", "NSAID", "400 mg PO q6h PRN"))
        .unwrap();
}

fn zero_layer(rows: usize, cols: usize) -> DenseLayer {
    DenseLayer {
        weights: vec![vec![0.0; cols]; rows],
        bias: vec![0.0; rows],
    }
}

/// An artifact whose disease head favors index 1 and whose heads ignore input.
fn artifact(input_width: usize, catalog_version: Option<String>) -> ArtifactFile {
    let mut disease_head = zero_layer(4, input_width);
    disease_head.bias = vec![0.5, 3.0, 1.0, 0.0];
    let mut test_head = zero_layer(2, input_width);
    test_head.bias = vec![2.0, -2.0];
    let mut medication_head = zero_layer(2, input_width);
    medication_head.bias = vec![-1.0, 1.0];

    ArtifactFile {
        format_version: ARTIFACT_FORMAT_VERSION,
        model_version: "v2.0".into(),
        catalog_version,
        input_width,
        hidden: Vec::new(),
        disease_head,
        test_head,
        medication_head,
        assessment_head: zero_layer(1, input_width),
    }
}

fn write_artifact(dir: &std::path::Path, version: &str, file: &ArtifactFile) {
    let path = dir.join(format!("clinical_model_{}.json", version));
    fs::write(path, serde_json::to_string_pretty(file).unwrap()).unwrap();
}

#[test]
fn test_scored_prediction_from_store_and_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");
    let catalog_version = {
        let db = Database::open(&db_path).unwrap();
        seed_store(&db);
        ReferenceCatalog::from_database(&db).unwrap().version().to_string()
    };
    write_artifact(dir.path(), "v2.0", &artifact(106, Some(catalog_version)));

    let config =
        PredictorConfig::new(dir.path().to_path_buf(), "v2.0".into(), Some(db_path)).unwrap();
    let predictor = Predictor::initialise(&config);

    let status = predictor.status();
    assert_eq!(status.mode, PredictionMode::Model);
    assert_eq!(status.model_version, "v2.0");
    assert_eq!(status.model_input_width, Some(106));
    assert_eq!(status.catalog_source, CatalogSource::Store);

    let mut record = PatientRecord::new(54, Sex::Female);
    record.symptom_list = vec!["cough".into()];
    let report = predictor.report(&record);

    assert_eq!(report.mode, PredictionMode::Model);
    let codes: Vec<&str> = report.predictions.iter().map(|p| p.icd10_code.as_str()).collect();
    assert_eq!(codes, vec!["J40", "R50.9", "J18.9"]);

    let top = &report.predictions[0];
    // sigmoid(2.0) passes the floor, sigmoid(-2.0) does not
    assert_eq!(top.recommended_tests.len(), 1);
    assert_eq!(top.recommended_tests[0].test, "Complete Blood Count (CBC)");
    assert_eq!(top.recommended_medications.len(), 2);
    assert_eq!(top.recommended_medications[0].medication, "Ibuprofen");
    assert!(top.assessment_plan.starts_with("ML model suggests bronchitis"));
    assert_eq!(top.rationale[0], "ML model prediction based on clinical features");

    let total: f64 = report.predictions.iter().map(|p| p.confidence).sum();
    assert!(total <= 1.0 + 1e-9);
}

#[test]
fn test_stale_catalog_version_forces_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let embedded = ReferenceCatalog::embedded();
    let mut file = artifact(106, Some("0".repeat(64)));
    file.disease_head = zero_layer(embedded.sizes().diseases, 106);
    write_artifact(dir.path(), "v1.0", &file);

    let config = PredictorConfig::new(dir.path().to_path_buf(), "v1.0".into(), None).unwrap();
    let predictor = Predictor::initialise(&config);

    let status = predictor.status();
    assert_eq!(status.mode, PredictionMode::Fallback);
    assert!(status
        .unavailable_reason
        .unwrap()
        .contains("Catalog version mismatch"));
}

#[test]
fn test_unversioned_artifact_checked_by_cardinality() {
    let dir = tempfile::tempdir().unwrap();
    // 4 diseases, 2 tests, 2 medications against an embedded 4/3/3 catalog
    write_artifact(dir.path(), "v1.0", &artifact(106, None));

    let config = PredictorConfig::new(dir.path().to_path_buf(), "v1.0".into(), None).unwrap();
    let status = Predictor::initialise(&config).status();
    assert_eq!(status.mode, PredictionMode::Fallback);
    assert!(status.unavailable_reason.unwrap().contains("test cardinality"));
}

#[test]
fn test_versioned_artifact_with_wider_heads_forces_fallback() {
    let catalog = ReferenceCatalog::embedded();
    let sizes = catalog.sizes();
    let mut file = artifact(106, Some(catalog.version().to_string()));
    let mut disease_head = zero_layer(10, 106);
    disease_head.bias = vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 5.0, 6.0, 7.0];
    file.disease_head = disease_head;
    file.test_head = zero_layer(sizes.tests, 106);
    file.medication_head = zero_layer(sizes.medications, 106);

    let dir = tempfile::tempdir().unwrap();
    write_artifact(dir.path(), "v1.0", &file);
    let config = PredictorConfig::new(dir.path().to_path_buf(), "v1.0".into(), None).unwrap();
    let predictor = Predictor::initialise(&config);

    let status = predictor.status();
    assert_eq!(status.mode, PredictionMode::Fallback);
    assert!(status
        .unavailable_reason
        .unwrap()
        .contains("disease cardinality"));

    let predictions = predictor.predict(&PatientRecord::default());
    assert_eq!(predictions.len(), 3);
    assert!(predictions.iter().all(|p| p.icd10_code != "R69"));
}

#[test]
fn test_legacy_width_artifact_is_reconciled() {
    let catalog = ReferenceCatalog::embedded();
    let sizes = catalog.sizes();
    let mut file = artifact(106, Some(catalog.version().to_string()));
    file.test_head = zero_layer(sizes.tests, 106);
    file.medication_head = zero_layer(sizes.medications, 106);

    let dir = tempfile::tempdir().unwrap();
    write_artifact(dir.path(), "v1.0", &file);
    let config = PredictorConfig::new(dir.path().to_path_buf(), "v1.0".into(), None).unwrap();
    let predictor = Predictor::initialise(&config);

    assert_eq!(predictor.mode(), PredictionMode::Model);
    assert_eq!(predictor.status().encoder_width, 109);

    let mut record = PatientRecord::new(70, Sex::Male);
    record.free_text_notes = Some("severe dilation noted".into());
    let predictions = predictor.predict(&record);
    assert_eq!(predictions.len(), 3);
    assert_eq!(predictions[0].icd10_code, "R50.9");

    let report = predictor.report(&record);
    assert!(report
        .clinical_warnings
        .iter()
        .any(|w| w.contains("cropped from 109 to 106")));
}

#[test]
fn test_corrupt_store_degrades_to_embedded() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");
    fs::write(&db_path, b"this is not sqlite").unwrap();

    let config =
        PredictorConfig::new(dir.path().to_path_buf(), "v1.0".into(), Some(db_path)).unwrap();
    let predictor = Predictor::initialise(&config);
    assert_eq!(predictor.catalog().source(), CatalogSource::Embedded);
    assert_eq!(predictor.mode(), PredictionMode::Fallback);
    assert_eq!(predictor.predict(&PatientRecord::default()).len(), 3);
}
