// ==============================================================================
// gc.rs - Genomic-Control Lambda Estimation
// ==============================================================================
// Description: Inflation factor of GWAS test statistics at a chosen quantile
// Version: 1.0.0
// ==============================================================================
// Reference: Devlin & Roeder (1999), "Genomic control for association studies"
// R equivalent:
//   qchisq(p, df=1, lower.tail=F) / qchisq(quantile, df=1, lower.tail=F)
// ==============================================================================

use statrs::function::erf::erfc_inv;

/// Upper-tail quantile of chi-squared with one degree of freedom
///
/// A 1-df chi-squared variable is the square of a standard normal, so
/// `P(X > x) = p` gives `x = 2 * erfc_inv(p)^2`. This stays accurate for
/// p-values far below the resolution of `1 - p`.
fn chi2_df1_upper_quantile(p: f64) -> f64 {
    let z = erfc_inv(p);
    2.0 * z * z
}

/// Genomic-control lambda for a single p-value taken at `quantile`
///
/// Returns 1.0 when `pval == quantile`; values above 1 indicate inflation.
pub fn gc_value(pval: f64, quantile: f64) -> f64 {
    chi2_df1_upper_quantile(pval) / chi2_df1_upper_quantile(quantile)
}

/// Genomic-control lambda at `quantile` of a list of -log10(p-values)
///
/// # Panics
/// `neglog10_pvals` must be sorted in decreasing order (most significant first).
///
/// An empty list has no quantile and yields NaN, which callers drop like any
/// other non-finite lambda.
pub fn gc_value_from_list(neglog10_pvals: &[f64], quantile: f64) -> f64 {
    assert_sorted_decreasing(neglog10_pvals);

    if neglog10_pvals.is_empty() {
        return f64::NAN;
    }

    let rank = (neglog10_pvals.len() as f64 * quantile) as usize;
    let neglog10_pval = neglog10_pvals[rank.min(neglog10_pvals.len() - 1)];
    let pval = 10f64.powf(-neglog10_pval);
    gc_value(pval, quantile)
}

/// Round `x` to `digits` significant digits
pub fn round_sig(x: f64, digits: i32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let decimals = digits - 1 - x.abs().log10().floor() as i32;
    if decimals >= 0 {
        let scale = 10f64.powi(decimals);
        (x * scale).round() / scale
    } else {
        let scale = 10f64.powi(-decimals);
        (x / scale).round() * scale
    }
}

/// Contract check shared by the GC estimator and the QQ binner
pub(crate) fn assert_sorted_decreasing(neglog10_pvals: &[f64]) {
    assert!(
        neglog10_pvals.windows(2).all(|w| w[0] >= w[1]),
        "-log10(p-values) must be sorted in decreasing order"
    );
}
