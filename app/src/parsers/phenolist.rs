// ==============================================================================
// phenolist.rs - Phenotype List Parser
// ==============================================================================
// Description: Loads the pheno-list.json array of phenotype descriptors
// Version: 1.0.0
// ==============================================================================
// Format: JSON array, one object per phenotype
// Example:
//   [
//     {"phenocode": "250.2", "assoc_files": ["/data/250.2.gz"], "num_cases": 120, "num_controls": 880},
//     {"phenocode": "401", "assoc_files": ["/data/401.gz"], "num_samples": 1000}
//   ]
// ==============================================================================

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::QqError;
use crate::models::Phenotype;

/// Read and validate a phenotype list
pub fn read_phenolist(path: impl AsRef<Path>) -> Result<Vec<Phenotype>, QqError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| QqError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let phenotypes: Vec<Phenotype> = serde_json::from_reader(BufReader::new(file))?;
    validate_phenolist(&phenotypes)?;
    Ok(phenotypes)
}

/// Phenocodes name output files, so they must be non-empty, unique and path-safe
fn validate_phenolist(phenotypes: &[Phenotype]) -> Result<(), QqError> {
    let mut seen = HashSet::new();
    for pheno in phenotypes {
        let code = pheno.phenocode.as_str();
        if code.is_empty() || code.contains('/') || code == "." || code == ".." {
            return Err(QqError::InvalidPhenolist(format!(
                "unusable phenocode {:?}",
                code
            )));
        }
        if !seen.insert(code) {
            return Err(QqError::InvalidPhenolist(format!(
                "duplicate phenocode {:?}",
                code
            )));
        }
    }
    Ok(())
}
