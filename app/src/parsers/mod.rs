// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Readers for per-phenotype variant files and the phenotype list
// Version: 1.0.0
// ==============================================================================

pub mod phenolist;
pub mod variant_file;

pub use phenolist::read_phenolist;
pub use variant_file::{VariantFileReader, VariantRecord};
