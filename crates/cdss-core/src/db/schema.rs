//! SQLite schema definition.

/// Reference catalog schema.
///
/// Row `id` order is the enumeration order shared with offline training, so
/// rows are never renumbered; retired entries are flagged with `is_active = 0`.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- ICD-10 Diagnoses
-- ============================================================================

CREATE TABLE IF NOT EXISTS icd10_codes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT '',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_icd10_active ON icd10_codes(is_active);

-- ============================================================================
-- Diagnostic Tests
-- ============================================================================

CREATE TABLE IF NOT EXISTS medical_tests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    test_name TEXT NOT NULL,
    test_code TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    typical_range TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_tests_active ON medical_tests(is_active);

-- ============================================================================
-- Medications
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    medication_name TEXT NOT NULL UNIQUE,
    generic_name TEXT NOT NULL DEFAULT '',
    drug_class TEXT NOT NULL DEFAULT '',
    typical_dosage TEXT NOT NULL DEFAULT '',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medications_active ON medications(is_active);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_icd10_code_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO icd10_codes (code, description) VALUES ('R51', 'Headache')",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO icd10_codes (code, description) VALUES ('R51', 'Duplicate')",
            [],
        );
        assert!(result.is_err());
    }
}
