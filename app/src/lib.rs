// ==============================================================================
// lib.rs - QQ Processor Library
// ==============================================================================
// Description: QQ plot binning, genomic-control lambda and MAF stratification
//              for per-phenotype GWAS results
// Version: 1.0.0
// ==============================================================================

pub mod config;
pub mod error;
pub mod gc;
pub mod maf;
pub mod models;
pub mod output;
pub mod parsers;
pub mod processor;
pub mod qq;
pub mod strata;

#[cfg(test)]
mod test_support;

pub use error::QqError;
pub use gc::{gc_value, gc_value_from_list};
pub use processor::{make_json_file, JobReport};
pub use qq::compute_qq;
pub use strata::{make_qq_stratified, make_qq_unstratified};
