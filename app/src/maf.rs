// ==============================================================================
// maf.rs - Minor Allele Frequency Lookup
// ==============================================================================
// Description: Derives a variant's MAF from whichever frequency columns it carries
// Version: 1.0.0
// ==============================================================================
// Sources, in priority order:
//   maf                      - reported directly
//   af                       - folded: min(af, 1 - af)
//   ac / (2 * sample_count)  - folded likewise; needs the phenotype's sample count
// ==============================================================================

use crate::config::MAF_AGREEMENT_TOLERANCE;
use crate::error::QqError;
use crate::models::Phenotype;
use crate::parsers::VariantRecord;

/// Look up the MAF of `record`, or None when no frequency data is available
///
/// Fails if the available estimates disagree by more than `MAF_AGREEMENT_TOLERANCE`.
pub fn get_maf(record: &VariantRecord, pheno: &Phenotype) -> Result<Option<f64>, QqError> {
    let mut mafs = Vec::with_capacity(3);

    if let Some(maf) = record.maf {
        mafs.push(maf);
    }
    if let Some(af) = record.af {
        mafs.push(fold(af));
    }
    if let (Some(ac), Some(samples)) = (record.ac, pheno.sample_count()) {
        if samples > 0 {
            let freq = ac / 2.0 / samples as f64;
            if freq > 1.0 {
                return Err(QqError::AlleleCountOutOfRange {
                    phenocode: pheno.phenocode.clone(),
                    variant: record.variant_id(),
                    ac,
                    sample_count: samples,
                });
            }
            mafs.push(fold(freq));
        }
    }

    let Some(&first) = mafs.first() else {
        return Ok(None);
    };

    let (min, max) = mafs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &m| (lo.min(m), hi.max(m)));
    if max - min > MAF_AGREEMENT_TOLERANCE {
        return Err(QqError::InconsistentMaf {
            phenocode: pheno.phenocode.clone(),
            variant: record.variant_id(),
            mafs,
            tolerance: MAF_AGREEMENT_TOLERANCE,
        });
    }

    Ok(Some(first))
}

fn fold(freq: f64) -> f64 {
    freq.min(1.0 - freq)
}
