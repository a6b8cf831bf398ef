//! Demographic and vital-sign normalization.
//!
//! Each field maps to `(raw - center) / scale`. Missing vitals encode as the
//! neutral `0.0`. The constants match the fitted artifacts and only change
//! together with retraining.

use crate::models::{PatientRecord, Sex};

/// Width of the vitals segment.
pub const VITALS_WIDTH: usize = 6;

pub const AGE_SCALE: f32 = 100.0;
pub const TEMPERATURE_CENTER: f32 = 37.0;
pub const TEMPERATURE_SCALE: f32 = 5.0;
pub const HEART_RATE_CENTER: f32 = 70.0;
pub const HEART_RATE_SCALE: f32 = 50.0;
pub const SYSTOLIC_CENTER: f32 = 120.0;
pub const SYSTOLIC_SCALE: f32 = 40.0;
pub const DIASTOLIC_CENTER: f32 = 80.0;
pub const DIASTOLIC_SCALE: f32 = 20.0;

/// Segment feature names, in encoding order.
pub const VITALS_FEATURE_NAMES: [&str; VITALS_WIDTH] = [
    "age_normalized",
    "sex_encoded",
    "temperature_normalized",
    "heart_rate_normalized",
    "systolic_bp_normalized",
    "diastolic_bp_normalized",
];

/// Maps age, sex and vitals to six centered, scaled scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct VitalsNormalizer;

impl VitalsNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize the demographic and vital fields of a record.
    pub fn normalize(&self, record: &PatientRecord) -> [f32; VITALS_WIDTH] {
        let vitals = &record.vitals;
        [
            record.age as f32 / AGE_SCALE,
            encode_sex(record.sex),
            scaled(vitals.temperature_c, TEMPERATURE_CENTER, TEMPERATURE_SCALE),
            scaled(vitals.heart_rate, HEART_RATE_CENTER, HEART_RATE_SCALE),
            scaled(vitals.systolic, SYSTOLIC_CENTER, SYSTOLIC_SCALE),
            scaled(vitals.diastolic, DIASTOLIC_CENTER, DIASTOLIC_SCALE),
        ]
    }
}

fn encode_sex(sex: Sex) -> f32 {
    match sex {
        Sex::Male => 0.0,
        Sex::Female => 1.0,
        Sex::Other => 0.5,
    }
}

fn scaled(raw: Option<f64>, center: f32, scale: f32) -> f32 {
    match raw {
        Some(value) if value.is_finite() => (value as f32 - center) / scale,
        _ => 0.0,
    }
}
