//! Domain models for the clinical decision support core.

mod catalog;
mod prediction;
mod record;

pub use catalog::*;
pub use prediction::*;
pub use record::*;
