// ==============================================================================
// config.rs - QQ Processing Constants and Data Layout
// ==============================================================================
// Description: Binning resolution, MAF strata, GC quantiles and directory layout
// Version: 1.0.0
// ==============================================================================

use std::path::{Path, PathBuf};

/// Resolution of the QQ bin grid along each axis (NUM_BINS x NUM_BINS)
pub const NUM_BINS: u32 = 1000;

/// Number of MAF strata a phenotype with frequency data is split into
pub const NUM_MAF_RANGES: usize = 4;

/// Quantiles at which genomic-control lambda is reported, keyed by JSON label
pub const GC_LAMBDA_QUANTILES: [(&str, f64); 4] = [
    ("0.5", 0.5),
    ("0.1", 0.1),
    ("0.01", 0.01),
    ("0.001", 0.001),
];

/// Significant digits kept for each reported lambda
pub const GC_LAMBDA_SIG_DIGITS: i32 = 5;

/// Significant digits kept for QQ coordinates when serialized
pub const QQ_COORD_SIG_DIGITS: i32 = 5;

/// Maximum spread allowed between the maf / af / ac derived estimates of one variant
pub const MAF_AGREEMENT_TOLERANCE: f64 = 0.05;

/// Paths of the generated data directory shared by the CLI and the worker
#[derive(Debug, Clone)]
pub struct DataLayout {
    data_dir: PathBuf,
}

impl DataLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Default location of the phenotype list
    pub fn phenolist_path(&self) -> PathBuf {
        self.data_dir.join("pheno-list.json")
    }

    /// Directory of per-phenotype variant files with p-values and MAF attached
    pub fn augmented_pheno_dir(&self) -> PathBuf {
        self.data_dir.join("augmented_pheno")
    }

    /// Directory receiving one QQ JSON document per phenotype
    pub fn qq_dir(&self) -> PathBuf {
        self.data_dir.join("qq")
    }

    pub fn source_path(&self, phenocode: &str) -> PathBuf {
        self.augmented_pheno_dir().join(phenocode)
    }

    pub fn dest_path(&self, phenocode: &str) -> PathBuf {
        self.qq_dir().join(format!("{}.json", phenocode))
    }
}
