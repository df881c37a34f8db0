// ==============================================================================
// strata.rs - MAF-Stratified and Overall QQ Summaries
// ==============================================================================
// Description: Splits variants into MAF strata and computes QQ data and GC lambdas
// Version: 1.0.0
// ==============================================================================

use tracing::{debug, warn};

use crate::config::{GC_LAMBDA_QUANTILES, GC_LAMBDA_SIG_DIGITS, NUM_MAF_RANGES};
use crate::gc::{gc_value_from_list, round_sig};
use crate::models::{GcLambdaTable, OverallSummary, Stratum, Variant};
use crate::qq::compute_qq;

/// QQ data for each of `NUM_MAF_RANGES` MAF strata, lowest MAF first
///
/// Variants are sorted by MAF and cut at `len * i / NUM_MAF_RANGES`, so strata
/// sizes differ by at most one. Strata left empty (fewer variants than strata)
/// are dropped.
///
/// Every variant must carry a MAF; callers check this before stratifying.
pub fn make_qq_stratified(variants: &[Variant]) -> Vec<Stratum> {
    let mut by_maf: Vec<(f64, f64)> = variants
        .iter()
        .map(|v| (maf_of(v), v.neglog10_pval))
        .collect();
    by_maf.sort_by(|a, b| a.0.total_cmp(&b.0));

    let len = by_maf.len();
    (0..NUM_MAF_RANGES)
        .filter_map(|idx| {
            let start = len * idx / NUM_MAF_RANGES;
            let end = len * (idx + 1) / NUM_MAF_RANGES;
            if start == end {
                debug!("MAF stratum {} is empty ({} variants total)", idx, len);
                return None;
            }
            let slice = &by_maf[start..end];
            Some(make_stratum(slice))
        })
        .collect()
}

fn make_stratum(slice: &[(f64, f64)]) -> Stratum {
    let mut neglog10_pvals: Vec<f64> = slice.iter().map(|&(_, p)| p).collect();
    sort_decreasing(&mut neglog10_pvals);

    Stratum {
        maf_range: (slice[0].0, slice[slice.len() - 1].0),
        count: neglog10_pvals.len(),
        qq: compute_qq(&neglog10_pvals),
    }
}

fn maf_of(variant: &Variant) -> f64 {
    debug_assert!(variant.maf.is_some(), "stratified variant without MAF");
    variant.maf.unwrap_or(f64::NAN)
}

/// Count, GC lambdas and (optionally) QQ data over all variants
///
/// A lambda that comes out NaN or infinite is logged and left out of the table.
pub fn make_qq_unstratified(variants: &[Variant], include_qq: bool) -> OverallSummary {
    let mut neglog10_pvals: Vec<f64> = variants.iter().map(|v| v.neglog10_pval).collect();
    sort_decreasing(&mut neglog10_pvals);

    let qq = include_qq.then(|| compute_qq(&neglog10_pvals));

    let mut gc_lambda = GcLambdaTable::new();
    for (label, quantile) in GC_LAMBDA_QUANTILES {
        let gc = gc_value_from_list(&neglog10_pvals, quantile);
        if gc.is_finite() {
            gc_lambda.insert(label, round_sig(gc, GC_LAMBDA_SIG_DIGITS));
        } else {
            warn!("Got gc_value {} at quantile {}, omitting it", gc, label);
        }
    }

    OverallSummary {
        qq,
        count: neglog10_pvals.len(),
        gc_lambda,
    }
}

fn sort_decreasing(values: &mut [f64]) {
    values.sort_unstable_by(|a, b| b.total_cmp(a));
}
