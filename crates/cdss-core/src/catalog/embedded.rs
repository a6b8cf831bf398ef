//! Minimal built-in catalog used when the store is unavailable.

use crate::models::{DiseaseEntry, MedicationEntry, TestEntry};

pub(super) fn diseases() -> Vec<DiseaseEntry> {
    vec![
        DiseaseEntry::new("J18.9", "Pneumonia, unspecified organism", "Respiratory"),
        DiseaseEntry::new("R50.9", "Fever, unspecified", "Symptoms"),
        DiseaseEntry::new("R51", "Headache", "Symptoms"),
        DiseaseEntry::new("R69", "Illness, unspecified", "Symptoms"),
    ]
}

pub(super) fn tests() -> Vec<TestEntry> {
    vec![
        TestEntry {
            name: "Complete Blood Count (CBC)".into(),
            code: "85025".into(),
            description: "Complete blood count".into(),
            category: "Laboratory".into(),
            typical_range: None,
        },
        TestEntry {
            name: "Chest X-ray (PA/AP)".into(),
            code: "71020".into(),
            description: "Chest X-ray".into(),
            category: "Imaging".into(),
            typical_range: None,
        },
        TestEntry {
            name: "Basic Metabolic Panel".into(),
            code: "80048".into(),
            description: "Basic metabolic panel".into(),
            category: "Laboratory".into(),
            typical_range: None,
        },
    ]
}

pub(super) fn medications() -> Vec<MedicationEntry> {
    vec![
        MedicationEntry::new("Acetaminophen", "Analgesic", "650 mg PO q6h PRN"),
        MedicationEntry::new("Ibuprofen", "NSAID", "400 mg PO q6h PRN"),
        MedicationEntry::new("Amoxicillin", "Antibiotic", "500 mg PO TID"),
    ]
}
