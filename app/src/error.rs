// ==============================================================================
// error.rs - QQ Processing Errors
// ==============================================================================
// Description: Recoverable failures of a single phenotype job
// Version: 1.0.0
// ==============================================================================
// Unsorted input to the GC estimator or QQ binner is a caller bug and panics
// instead of producing one of these.
// ==============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while processing one phenotype
#[derive(Error, Debug)]
pub enum QqError {
    #[error("Failed to read {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed variant row at line {line}: {details}")]
    MalformedRow { line: u64, details: String },

    #[error("Invalid p-value at line {line}: {value} (must be within [0, 1])")]
    InvalidPvalue { line: u64, value: f64 },

    #[error("Invalid {column} at line {line}: {value}")]
    InvalidFrequency {
        line: u64,
        column: &'static str,
        value: f64,
    },

    #[error("Variant {variant} in phenotype {phenocode} has MAF estimates {mafs:?} differing by more than {tolerance}")]
    InconsistentMaf {
        phenocode: String,
        variant: String,
        mafs: Vec<f64>,
        tolerance: f64,
    },

    #[error("Variant {variant} in phenotype {phenocode} has allele count {ac}, more than 2 * {sample_count} samples")]
    AlleleCountOutOfRange {
        phenocode: String,
        variant: String,
        ac: f64,
        sample_count: u64,
    },

    #[error("Phenotype {phenocode} has MAF on its first variant but not on variant {variant}")]
    MissingMaf { phenocode: String, variant: String },

    #[error("Invalid phenotype list: {0}")]
    InvalidPhenolist(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
