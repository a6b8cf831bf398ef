//! Reference catalog database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{DiseaseEntry, MedicationEntry, TestEntry};

/// Maximum rows returned by a description search.
const SEARCH_LIMIT: usize = 10;

impl Database {
    /// Insert or update a diagnosis. Existing rows keep their `id`.
    pub fn upsert_disease(&self, entry: &DiseaseEntry) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO icd10_codes (code, description, category, is_active)
            VALUES (?1, ?2, ?3, 1)
            ON CONFLICT(code) DO UPDATE SET
                description = excluded.description,
                category = excluded.category,
                is_active = 1
            "#,
            params![entry.code, entry.description, entry.category],
        )?;
        Ok(())
    }

    /// Insert or update a diagnostic test.
    pub fn upsert_test(&self, entry: &TestEntry) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medical_tests (test_name, test_code, description, category, typical_range, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, 1)
            ON CONFLICT(test_code) DO UPDATE SET
                test_name = excluded.test_name,
                description = excluded.description,
                category = excluded.category,
                typical_range = excluded.typical_range,
                is_active = 1
            "#,
            params![
                entry.name,
                entry.code,
                entry.description,
                entry.category,
                entry.typical_range,
            ],
        )?;
        Ok(())
    }

    /// Insert or update a medication.
    pub fn upsert_medication(&self, entry: &MedicationEntry) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medications (medication_name, generic_name, drug_class, typical_dosage, is_active)
            VALUES (?1, ?2, ?3, ?4, 1)
            ON CONFLICT(medication_name) DO UPDATE SET
                generic_name = excluded.generic_name,
                drug_class = excluded.drug_class,
                typical_dosage = excluded.typical_dosage,
                is_active = 1
            "#,
            params![
                entry.name,
                entry.generic_name,
                entry.drug_class,
                entry.typical_dosage,
            ],
        )?;
        Ok(())
    }

    /// Active diagnoses in `id` order.
    pub fn list_active_diseases(&self) -> DbResult<Vec<DiseaseEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT code, description, category
            FROM icd10_codes
            WHERE is_active = 1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], disease_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Active tests in `id` order.
    pub fn list_active_tests(&self) -> DbResult<Vec<TestEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT test_name, test_code, description, category, typical_range
            FROM medical_tests
            WHERE is_active = 1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TestEntry {
                name: row.get(0)?,
                code: row.get(1)?,
                description: row.get(2)?,
                category: row.get(3)?,
                typical_range: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Active medications in `id` order.
    pub fn list_active_medications(&self) -> DbResult<Vec<MedicationEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT medication_name, generic_name, drug_class, typical_dosage
            FROM medications
            WHERE is_active = 1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MedicationEntry {
                name: row.get(0)?,
                generic_name: row.get(1)?,
                drug_class: row.get(2)?,
                typical_dosage: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Get a diagnosis by ICD-10 code.
    pub fn get_disease_by_code(&self, code: &str) -> DbResult<Option<DiseaseEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT code, description, category FROM icd10_codes WHERE code = ?",
                [code.trim()],
                disease_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Search active diagnoses whose description contains `term`.
    pub fn search_diseases(&self, term: &str) -> DbResult<Vec<DiseaseEntry>> {
        let pattern = format!("%{}%", escape_like(term.trim()));
        let mut stmt = self.conn.prepare(
            r#"
            SELECT code, description, category
            FROM icd10_codes
            WHERE description LIKE ?1 ESCAPE '\'
            AND is_active = 1
            ORDER BY id
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![pattern, SEARCH_LIMIT as i64], disease_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Retire a diagnosis without renumbering the remaining rows.
    pub fn deactivate_disease(&self, code: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("UPDATE icd10_codes SET is_active = 0 WHERE code = ?", [code])?;
        Ok(rows_affected > 0)
    }
}

fn disease_from_row(row: &Row<'_>) -> rusqlite::Result<DiseaseEntry> {
    Ok(DiseaseEntry {
        code: row.get(0)?,
        description: row.get(1)?,
        category: row.get(2)?,
    })
}

/// Escape LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
