//! Frequentist duration estimation via two-proportion power analysis.
//!
//! Closed-form and fully deterministic. For a baseline rate `p`, relative
//! improvement `i`, and the two-sided critical value `zα` at the
//! requested confidence plus `zβ` at the fixed 80% power target:
//!
//! ```text
//! mde = p · i
//! n   = ceil( (zα + zβ)² · 2p(1−p) / mde² )     (per variation)
//! ```
//!
//! Total sample size is `n × variations` and the duration is
//! `ceil(total / daily test visitors)`. A zero minimum detectable effect
//! or zero daily test visitors makes the corresponding field unbounded
//! instead of dividing by zero.

use crate::params::TestParameters;
use crate::statistics::normal::{z_alpha, z_beta_80};
use crate::types::{Bound, DurationEstimate};

/// Per-variation sample size for the two-proportion test, or `None` when
/// the minimum detectable effect is zero.
pub(crate) fn required_sample_per_variation(
    baseline_rate: f64,
    improvement_fraction: f64,
    confidence_percent: f64,
) -> Option<u64> {
    let mde = baseline_rate * improvement_fraction;
    if mde == 0.0 {
        return None;
    }

    let z_a = z_alpha(confidence_percent);
    let z_b = z_beta_80();
    let numerator = (z_a + z_b).powi(2) * 2.0 * baseline_rate * (1.0 - baseline_rate);
    Some((numerator / (mde * mde)).ceil() as u64)
}

/// Days needed to collect `total` subjects at `daily_test_visitors` per day.
pub(crate) fn days_for_total(total: u64, daily_test_visitors: f64) -> Bound {
    if daily_test_visitors <= 0.0 {
        return Bound::Unbounded;
    }
    Bound::Finite((total as f64 / daily_test_visitors).ceil() as u64)
}

/// Estimate test duration with the frequentist power analysis.
///
/// Identical parameters always yield the identical estimate; there is no
/// randomness anywhere on this path.
pub fn estimate_frequentist(params: &TestParameters) -> DurationEstimate {
    let per_variation = match required_sample_per_variation(
        params.baseline_rate(),
        params.improvement_fraction(),
        params.confidence_percent,
    ) {
        Some(n) => n,
        None => return DurationEstimate::unbounded(),
    };

    let total = per_variation * params.variations as u64;
    DurationEstimate {
        days: days_for_total(total, params.daily_test_visitors()),
        min_sample_size: Bound::Finite(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TestParameters {
        TestParameters::new(1000.0, 100.0, 10.0)
    }

    #[test]
    fn test_golden_values() {
        // p = 0.1, mde = 0.01, zα = 1.95996, zβ = 0.84162:
        // n = ceil(7.84888 · 0.18 / 1e-4) = 14,128 per variation.
        let est = estimate_frequentist(&params());
        assert_eq!(est.min_sample_size, Bound::Finite(28_256));
        assert_eq!(est.days, Bound::Finite(29));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(estimate_frequentist(&params()), estimate_frequentist(&params()));
    }

    #[test]
    fn test_sample_size_decreases_with_improvement() {
        let sizes: Vec<u64> = [5.0, 10.0, 20.0, 40.0]
            .iter()
            .map(|&imp| {
                estimate_frequentist(&TestParameters::new(1000.0, 100.0, imp))
                    .min_sample_size
                    .finite()
                    .unwrap()
            })
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] > w[1]), "{sizes:?}");
    }

    #[test]
    fn test_zero_conversions_is_unbounded() {
        let est = estimate_frequentist(&TestParameters::new(1000.0, 0.0, 10.0));
        assert_eq!(est, DurationEstimate::unbounded());
    }

    #[test]
    fn test_zero_traffic_days_unbounded() {
        let mut p = params();
        p.traffic_percent = 0.0;
        let est = estimate_frequentist(&p);
        // Sample size is still finite; only the duration diverges.
        assert_eq!(est.min_sample_size, Bound::Finite(28_256));
        assert!(est.days.is_unbounded());
    }

    #[test]
    fn test_more_variations_need_more_samples_and_days() {
        let two = estimate_frequentist(&params());
        let three = estimate_frequentist(&params().variations(3));
        assert!(
            three.min_sample_size.finite().unwrap() > two.min_sample_size.finite().unwrap()
        );
        assert!(three.days.finite().unwrap() >= two.days.finite().unwrap());
    }
}
