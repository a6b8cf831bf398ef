//! Reference catalog descriptors.

use serde::{Deserialize, Serialize};

/// An ICD-10 diagnosis entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseEntry {
    /// ICD-10 code (e.g., "J18.9")
    pub code: String,
    /// Human-readable description
    pub description: String,
    /// Grouping such as "Respiratory"
    pub category: String,
}

/// A diagnostic test entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestEntry {
    /// Display name (e.g., "Complete Blood Count (CBC)")
    pub name: String,
    /// CPT/LOINC code
    pub code: String,
    pub description: String,
    /// "Laboratory", "Imaging", ...
    pub category: String,
    /// Reference range, when the test has one
    pub typical_range: Option<String>,
}

/// A medication entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationEntry {
    /// Display name
    pub name: String,
    pub generic_name: String,
    pub drug_class: String,
    /// Dose suggestion surfaced with recommendations
    pub typical_dosage: String,
}

impl DiseaseEntry {
    pub fn new(code: &str, description: &str, category: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            category: category.to_string(),
        }
    }

    /// Match a code ignoring surrounding whitespace and case.
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.trim().eq_ignore_ascii_case(code.trim())
    }
}

impl TestEntry {
    pub fn new(name: &str, code: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            description: name.to_string(),
            category: category.to_string(),
            typical_range: None,
        }
    }
}

impl MedicationEntry {
    pub fn new(name: &str, drug_class: &str, typical_dosage: &str) -> Self {
        Self {
            name: name.to_string(),
            generic_name: name.to_string(),
            drug_class: drug_class.to_string(),
            typical_dosage: typical_dosage.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_code() {
        let entry = DiseaseEntry::new("J18.9 ", "Pneumonia, unspecified organism", "Respiratory");
        assert!(entry.matches_code("J18.9"));
        assert!(entry.matches_code("j18.9"));
        assert!(!entry.matches_code("J18"));
    }

    #[test]
    fn test_defaults_from_new() {
        let test = TestEntry::new("Urinalysis", "81001", "Laboratory");
        assert_eq!(test.description, "Urinalysis");
        assert!(test.typical_range.is_none());

        let med = MedicationEntry::new("Ibuprofen", "NSAID", "400 mg PO q6h PRN");
        assert_eq!(med.generic_name, "Ibuprofen");
    }
}
