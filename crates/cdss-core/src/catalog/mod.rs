//! Reference catalog: the ordered disease, test and medication tables.
//!
//! Position in each table is the class index used by scoring artifacts, so a
//! catalog is built once at startup and never mutated afterwards. The catalog
//! version is a content hash over the ordered codes; artifacts record the
//! version they were fitted against.

mod embedded;

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{DiseaseEntry, MedicationEntry, TestEntry};

/// Catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Catalog table is empty: {0}")]
    Empty(&'static str),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Where a catalog was loaded from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    Store,
    Embedded,
}

/// Table cardinalities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSizes {
    pub diseases: usize,
    pub tests: usize,
    pub medications: usize,
}

/// Immutable, index-addressed reference tables.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    diseases: Vec<DiseaseEntry>,
    tests: Vec<TestEntry>,
    medications: Vec<MedicationEntry>,
    source: CatalogSource,
    version: String,
}

impl ReferenceCatalog {
    /// Build a catalog from already-ordered tables.
    pub fn from_parts(
        diseases: Vec<DiseaseEntry>,
        tests: Vec<TestEntry>,
        medications: Vec<MedicationEntry>,
        source: CatalogSource,
    ) -> Self {
        let version = catalog_version(&diseases, &tests, &medications);
        Self {
            diseases,
            tests,
            medications,
            source,
            version,
        }
    }

    /// The built-in minimal catalog.
    pub fn embedded() -> Self {
        Self::from_parts(
            embedded::diseases(),
            embedded::tests(),
            embedded::medications(),
            CatalogSource::Embedded,
        )
    }

    /// Enumerate the active rows of the store in `id` order.
    pub fn from_database(db: &Database) -> CatalogResult<Self> {
        let diseases = db.list_active_diseases()?;
        if diseases.is_empty() {
            return Err(CatalogError::Empty("icd10_codes"));
        }
        let tests = db.list_active_tests()?;
        let medications = db.list_active_medications()?;

        Ok(Self::from_parts(
            diseases,
            tests,
            medications,
            CatalogSource::Store,
        ))
    }

    /// Load from the store at `path`, degrading to the embedded catalog when
    /// no path is configured or the store cannot be read. The store is
    /// opened read-only.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("No catalog store configured, using embedded catalog");
            return Self::embedded();
        };

        let loaded = Database::open_read_only(path)
            .map_err(CatalogError::from)
            .and_then(|db| Self::from_database(&db));

        match loaded {
            Ok(catalog) => {
                let sizes = catalog.sizes();
                tracing::info!(
                    path = %path.display(),
                    diseases = sizes.diseases,
                    tests = sizes.tests,
                    medications = sizes.medications,
                    version = %catalog.version(),
                    "Loaded reference catalog"
                );
                catalog
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Reference catalog unavailable, using embedded catalog"
                );
                Self::embedded()
            }
        }
    }

    pub fn diseases(&self) -> &[DiseaseEntry] {
        &self.diseases
    }

    pub fn tests(&self) -> &[TestEntry] {
        &self.tests
    }

    pub fn medications(&self) -> &[MedicationEntry] {
        &self.medications
    }

    pub fn disease(&self, index: usize) -> Option<&DiseaseEntry> {
        self.diseases.get(index)
    }

    pub fn test(&self, index: usize) -> Option<&TestEntry> {
        self.tests.get(index)
    }

    pub fn medication(&self, index: usize) -> Option<&MedicationEntry> {
        self.medications.get(index)
    }

    /// Find a diagnosis by ICD-10 code.
    pub fn disease_by_code(&self, code: &str) -> Option<&DiseaseEntry> {
        self.diseases.iter().find(|d| d.matches_code(code))
    }

    /// Find a test by display name, ignoring case.
    pub fn test_by_name(&self, name: &str) -> Option<&TestEntry> {
        self.tests
            .iter()
            .find(|t| t.name.trim().eq_ignore_ascii_case(name.trim()))
    }

    pub fn sizes(&self) -> CatalogSizes {
        CatalogSizes {
            diseases: self.diseases.len(),
            tests: self.tests.len(),
            medications: self.medications.len(),
        }
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    /// Content hash identifying this enumeration.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// SHA-256 over the ordered codes of the three tables.
fn catalog_version(
    diseases: &[DiseaseEntry],
    tests: &[TestEntry],
    medications: &[MedicationEntry],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"diseases\n");
    for d in diseases {
        hasher.update(d.code.trim().as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"tests\n");
    for t in tests {
        hasher.update(t.code.trim().as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"medications\n");
    for m in medications {
        hasher.update(m.name.trim().as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        for entry in embedded::diseases() {
            db.upsert_disease(&entry).unwrap();
        }
        for entry in embedded::tests() {
            db.upsert_test(&entry).unwrap();
        }
        for entry in embedded::medications() {
            db.upsert_medication(&entry).unwrap();
        }
        db
    }

    #[test]
    fn test_embedded_catalog() {
        let catalog = ReferenceCatalog::embedded();
        assert_eq!(catalog.source(), CatalogSource::Embedded);
        assert_eq!(
            catalog.sizes(),
            CatalogSizes {
                diseases: 4,
                tests: 3,
                medications: 3
            }
        );
        assert_eq!(catalog.disease(0).unwrap().code, "J18.9");
        assert!(catalog.disease(4).is_none());
        assert_eq!(
            catalog.test_by_name("complete blood count (cbc)").unwrap().code,
            "85025"
        );
    }

    #[test]
    fn test_store_matches_embedded_version() {
        let db = seeded_db();
        let catalog = ReferenceCatalog::from_database(&db).unwrap();
        assert_eq!(catalog.source(), CatalogSource::Store);
        assert_eq!(catalog.version(), ReferenceCatalog::embedded().version());
    }

    #[test]
    fn test_version_tracks_order() {
        let mut diseases = embedded::diseases();
        let a = ReferenceCatalog::from_parts(
            diseases.clone(),
            embedded::tests(),
            embedded::medications(),
            CatalogSource::Store,
        );
        diseases.swap(0, 1);
        let b = ReferenceCatalog::from_parts(
            diseases,
            embedded::tests(),
            embedded::medications(),
            CatalogSource::Store,
        );
        assert_ne!(a.version(), b.version());
        assert_eq!(a.version().len(), 64);
    }

    #[test]
    fn test_empty_store_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            ReferenceCatalog::from_database(&db),
            Err(CatalogError::Empty("icd10_codes"))
        ));
    }

    #[test]
    fn test_load_degrades_to_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let catalog = ReferenceCatalog::load(Some(&path));
        assert_eq!(catalog.source(), CatalogSource::Embedded);
        assert!(!path.exists());

        // An empty store is as good as a missing one
        let empty = dir.path().join("empty.db");
        Database::open(&empty).unwrap();
        assert_eq!(
            ReferenceCatalog::load(Some(&empty)).source(),
            CatalogSource::Embedded
        );

        assert_eq!(
            ReferenceCatalog::load(None).source(),
            CatalogSource::Embedded
        );
    }

    #[test]
    fn test_load_leaves_foreign_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.db");
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE notes (body TEXT);").unwrap();
        }

        let catalog = ReferenceCatalog::load(Some(&path));
        assert_eq!(catalog.source(), CatalogSource::Embedded);

        let conn = rusqlite::Connection::open(&path).unwrap();
        let tables: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type='table'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_load_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let db = Database::open(&path).unwrap();
            db.upsert_disease(&DiseaseEntry::new("J40", "Bronchitis", "Respiratory"))
                .unwrap();
        }

        let catalog = ReferenceCatalog::load(Some(&path));
        assert_eq!(catalog.source(), CatalogSource::Store);
        assert_eq!(catalog.sizes().diseases, 1);
        assert_eq!(catalog.disease_by_code("j40").unwrap().description, "Bronchitis");
    }
}
