// ==============================================================================
// qq.rs - QQ Plot Binning
// ==============================================================================
// Description: Downsamples (expected, observed) -log10(p) pairs onto a fixed grid
// Version: 1.0.0
// ==============================================================================
// Each variant is mapped to a cell of a NUM_BINS x NUM_BINS grid spanning
// [0, max_expected] x [0, max_observed]. Only occupied cells are emitted, so the
// output never exceeds (NUM_BINS + 1)^2 points whatever the number of variants.
// ==============================================================================

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::NUM_BINS;
use crate::gc::assert_sorted_decreasing;
use crate::models::QqPoint;

/// Compute the binned QQ curve of a list of -log10(p-values)
///
/// # Arguments
/// * `neglog10_pvals` - observed -log10(p), sorted in decreasing order
///
/// # Returns
/// Distinct bin centres mapped back to -log10 space, sorted ascending by
/// (expected, observed). Empty for empty input, and empty (with a warning)
/// when every p-value is 1.
///
/// # Panics
/// If `neglog10_pvals` is not sorted in decreasing order.
pub fn compute_qq(neglog10_pvals: &[f64]) -> Vec<QqPoint> {
    assert_sorted_decreasing(neglog10_pvals);

    if neglog10_pvals.is_empty() {
        return Vec::new();
    }

    let n = neglog10_pvals.len() as f64;
    let max_exp_neglog10_pval = -(0.5 / n).log10();
    let max_obs_neglog10_pval = neglog10_pvals[0];

    if max_obs_neglog10_pval == 0.0 {
        warn!("All p-values are 1, so there is no QQ plot to draw");
        return Vec::new();
    }

    let num_bins = NUM_BINS as f64;
    let mut occupied_bins: HashSet<(u32, u32)> = HashSet::new();
    for (i, &obs_neglog10_pval) in neglog10_pvals.iter().enumerate() {
        let exp_neglog10_pval = -((i as f64 + 0.5) / n).log10();
        let exp_bin = to_bin(exp_neglog10_pval / max_exp_neglog10_pval * num_bins);
        let obs_bin = to_bin(obs_neglog10_pval / max_obs_neglog10_pval * num_bins);
        occupied_bins.insert((exp_bin, obs_bin));
    }

    // HashSet iteration order is arbitrary; the sort makes the output deterministic
    let mut bins: Vec<(u32, u32)> = occupied_bins.into_iter().collect();
    bins.sort_unstable();

    debug!(
        "Binned {} p-values into {} QQ points",
        neglog10_pvals.len(),
        bins.len()
    );

    bins.into_iter()
        .map(|(exp_bin, obs_bin)| {
            QqPoint::new(
                exp_bin as f64 / num_bins * max_exp_neglog10_pval,
                obs_bin as f64 / num_bins * max_obs_neglog10_pval,
            )
        })
        .collect()
}

/// Truncate a scaled value to its grid cell, clamped to [0, NUM_BINS]
fn to_bin(scaled: f64) -> u32 {
    (scaled.max(0.0) as u32).min(NUM_BINS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::with_captured_logs;

    fn uniform_neglog10_pvals(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| -((i as f64 + 0.5) / n as f64).log10())
            .collect()
    }

    fn assert_sorted_and_distinct(qq: &[QqPoint]) {
        for pair in qq.windows(2) {
            let a = (pair[0].expected, pair[0].observed);
            let b = (pair[1].expected, pair[1].observed);
            assert!(a < b, "{:?} should sort strictly before {:?}", a, b);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_qq(&[]).is_empty());
    }

    #[test]
    fn test_all_pvalues_one_warns_and_returns_empty() {
        let (qq, logs) = with_captured_logs(|| compute_qq(&[0.0, 0.0, 0.0]));
        assert!(qq.is_empty());
        assert!(logs.contains("WARN"), "logs: {}", logs);
        assert!(logs.contains("All p-values are 1"), "logs: {}", logs);
    }

    #[test]
    fn test_single_variant() {
        let qq = compute_qq(&[2.0]);
        let max_exp = -(0.5f64).log10();
        assert_eq!(qq.len(), 1);
        assert!((qq[0].expected - max_exp).abs() < 1e-12);
        assert_eq!(qq[0].observed, 2.0);
    }

    #[test]
    fn test_output_sorted_distinct_and_bounded() {
        let mut neglog10_pvals = uniform_neglog10_pvals(50_000);
        // Inflate the tail so observed and expected maxima differ
        for value in neglog10_pvals.iter_mut().take(100) {
            *value *= 3.0;
        }
        let max_exp = -(0.5 / neglog10_pvals.len() as f64).log10();
        let max_obs = neglog10_pvals[0];

        let qq = compute_qq(&neglog10_pvals);

        assert!(!qq.is_empty());
        assert!(qq.len() < neglog10_pvals.len());
        assert_sorted_and_distinct(&qq);
        for point in &qq {
            assert!(point.expected >= 0.0 && point.expected <= max_exp + 1e-12);
            assert!(point.observed >= 0.0 && point.observed <= max_obs + 1e-12);
        }
    }

    #[test]
    fn test_output_bounded_by_grid() {
        let qq = compute_qq(&uniform_neglog10_pvals(200_000));
        let grid = (NUM_BINS as usize + 1) * (NUM_BINS as usize + 1);
        assert!(qq.len() <= grid);
        // Least significant points collapse into shared cells
        assert!(qq.len() < 200_000);
    }

    #[test]
    fn test_most_significant_point_maps_to_top_corner() {
        let neglog10_pvals = uniform_neglog10_pvals(1_000);
        let max_exp = -(0.5 / 1_000f64).log10();
        let qq = compute_qq(&neglog10_pvals);
        let last = qq.last().unwrap();
        assert!((last.expected - max_exp).abs() < 1e-9);
        assert!((last.observed - neglog10_pvals[0]).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let neglog10_pvals = uniform_neglog10_pvals(10_000);
        assert_eq!(compute_qq(&neglog10_pvals), compute_qq(&neglog10_pvals));
    }

    #[test]
    fn test_duplicate_values_collapse() {
        let qq = compute_qq(&[1.0, 1.0, 1.0, 1.0]);
        // Observed bin is identical, expected bins differ
        assert_eq!(qq.len(), 4);
        assert!(qq.iter().all(|p| p.observed == 1.0));
        assert_sorted_and_distinct(&qq);
    }

    #[test]
    #[should_panic(expected = "decreasing order")]
    fn test_rejects_unsorted_input() {
        compute_qq(&[0.5, 3.0, 1.0]);
    }
}
