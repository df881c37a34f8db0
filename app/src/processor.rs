// ==============================================================================
// processor.rs - Per-Phenotype QQ Job
// ==============================================================================
// Description: Reads one phenotype's variants and writes its QQ / GC lambda JSON
// Version: 1.0.0
// ==============================================================================
// Pipeline:
//   1. Stream variant records from the source file
//   2. Augment: drop p = 0, attach -log10(p) and MAF
//   3. MAF on the first variant -> stratified by MAF, otherwise overall QQ
//   4. Write the JSON document atomically
// ==============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::QqError;
use crate::maf::get_maf;
use crate::models::{Phenotype, PhenotypeResult, Variant};
use crate::output::write_json;
use crate::parsers::{VariantFileReader, VariantRecord};
use crate::strata::{make_qq_stratified, make_qq_unstratified};

/// Variants ready for QQ statistics plus bookkeeping from augmentation
#[derive(Debug, Clone, Default)]
pub struct AugmentedVariants {
    pub variants: Vec<Variant>,
    /// Records skipped because their p-value was exactly 0
    pub skipped_zero_pval: usize,
}

/// Outcome of one successful phenotype job
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub phenocode: String,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub variants_read: usize,
    pub skipped_zero_pval: usize,
    pub stratified: bool,
}

/// Convert raw records into `Variant`s
///
/// A record with p-value 0 has no -log10 value; it is logged and skipped. When
/// the first kept variant has a MAF, every later one must have one as well.
pub fn augment_variants<I>(records: I, pheno: &Phenotype) -> Result<AugmentedVariants, QqError>
where
    I: IntoIterator<Item = Result<VariantRecord, QqError>>,
{
    let mut augmented = AugmentedVariants::default();
    let mut has_maf: Option<bool> = None;

    for record in records {
        let record = record?;

        if record.pval == 0.0 {
            warn!(
                "There's a variant with pval 0 in {:?} (variant {}), skipping it",
                pheno.phenocode,
                record.variant_id()
            );
            augmented.skipped_zero_pval += 1;
            continue;
        }

        let maf = get_maf(&record, pheno)?;
        let expects_maf = *has_maf.get_or_insert(maf.is_some());
        if expects_maf && maf.is_none() {
            return Err(QqError::MissingMaf {
                phenocode: pheno.phenocode.clone(),
                variant: record.variant_id(),
            });
        }

        augmented.variants.push(Variant {
            // 0.0 - x keeps p = 1 at +0.0 rather than -0.0
            neglog10_pval: 0.0 - record.pval.log10(),
            maf,
        });
    }

    Ok(augmented)
}

/// Assemble the QQ document for a phenotype's augmented variants
pub fn build_result(variants: &[Variant]) -> PhenotypeResult {
    let Some(first) = variants.first() else {
        return PhenotypeResult::default();
    };

    if first.maf.is_some() {
        PhenotypeResult {
            overall: Some(make_qq_unstratified(variants, false)),
            by_maf: Some(make_qq_stratified(variants)),
        }
    } else {
        PhenotypeResult {
            overall: Some(make_qq_unstratified(variants, true)),
            by_maf: None,
        }
    }
}

/// Run the full job for one phenotype: `src` variant file -> `dest` JSON
pub fn make_json_file(src: &Path, dest: &Path, pheno: &Phenotype) -> Result<JobReport> {
    let started = Instant::now();
    info!("Processing phenotype {}: {:?}", pheno.phenocode, src);

    let reader = VariantFileReader::open(src)
        .with_context(|| format!("Failed to open variant file for {}", pheno.phenocode))?;
    let augmented = augment_variants(reader, pheno)
        .with_context(|| format!("Failed to read variants for {}", pheno.phenocode))?;

    debug!(
        "Augmented {} variants for {} ({} skipped with pval 0)",
        augmented.variants.len(),
        pheno.phenocode,
        augmented.skipped_zero_pval
    );

    let result = build_result(&augmented.variants);
    write_json(dest, &result)
        .with_context(|| format!("Failed to write QQ JSON for {}", pheno.phenocode))?;

    info!(
        "{:?} -> {:?} ({} variants, {:.2}s)",
        src,
        dest,
        augmented.variants.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(JobReport {
        phenocode: pheno.phenocode.clone(),
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        variants_read: augmented.variants.len(),
        skipped_zero_pval: augmented.skipped_zero_pval,
        stratified: result.by_maf.is_some(),
    })
}
