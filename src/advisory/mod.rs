//! Clinical helpers offered next to prescription analysis: a known-pair
//! interaction check and a weight-based dosage estimate. Both are
//! table/rule driven and make no network calls.

pub mod dosage;
pub mod interactions;

pub use dosage::*;
pub use interactions::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AdvisoryError {
    #[error("Medication name is required")]
    MissingMedication,

    #[error("Weight must be a positive number of kilograms, got {0}")]
    InvalidWeight(f64),
}
