//! Confidence evolution simulator.
//!
//! Projects how measured confidence and interval width would plausibly
//! move over the life of a running test. The curve combines a true
//! asymptotic power value at each sample size with a three-phase
//! heuristic overlay reproducing the well-known small-sample pathology:
//!
//! 1. **Inflation**: tiny early samples report misleadingly high
//!    confidence, with heavy noise.
//! 2. **Correction**: confidence drops toward the true value as the
//!    sample grows past the uncertainty window.
//! 3. **Convergence**: steady recovery to the asymptotic curve with
//!    fading noise.
//!
//! The overlay is an engineered behavioral contract, not a statistical
//! quantity: phase boundaries, clamps, and noise scales are fixed
//! constants that downstream chart consumers rely on. All randomness is
//! drawn from a generator seeded by hashing the input parameters, so
//! identical requests produce bit-identical trajectories.

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::params::TestParameters;
use crate::statistics::normal::{normal_power, z_alpha, z_beta_80};
use crate::types::{Bound, ConfidenceTrajectory, TrajectoryPoint};

/// Default number of chart points.
pub const DEFAULT_POINT_COUNT: usize = 20;

/// Blend factor between logarithmic and linear point spacing
/// (0 = purely logarithmic, 1 = purely linear).
const SPACING_BLEND: f64 = 0.7;

/// The uncertainty window never exceeds this share of the test.
const MAX_UNCERTAINTY_SHARE: f64 = 0.15;

/// Simulate the evolution of confidence over a running test.
///
/// Produces at most `point_count` points in two parallel views (by
/// sample size and by day, unique strictly increasing days in both).
/// Degenerate parameters (zero minimum detectable effect or zero daily
/// test visitors) return the empty trajectory with unbounded totals.
///
/// # Panics
///
/// Panics if `point_count < 2`.
pub fn simulate_confidence_evolution(
    params: &TestParameters,
    point_count: usize,
) -> ConfidenceTrajectory {
    assert!(point_count >= 2, "need at least two trajectory points");

    let p = params.baseline_rate();
    let improvement = params.improvement_fraction();
    let variations = params.variations as f64;
    let confidence = params.confidence_percent;

    let z_a = z_alpha(confidence);
    let z_b = z_beta_80();

    let mde = p * improvement;
    let daily_test_visitors = params.daily_test_visitors();
    if mde == 0.0 || daily_test_visitors <= 0.0 {
        return ConfidenceTrajectory::degenerate();
    }

    let numerator = (z_a + z_b).powi(2) * 2.0 * p * (1.0 - p);
    let per_variation = (numerator / (mde * mde)).ceil();
    let total_sample_size = per_variation * variations;
    let days_needed = (total_sample_size / daily_test_visitors).ceil();

    // Sample size required at 99% confidence bounds the chart range.
    let z_a_99 = z_alpha(99.0);
    let numerator_99 = (z_a_99 + z_b).powi(2) * 2.0 * p * (1.0 - p);
    let per_variation_99 = (numerator_99 / (mde * mde)).ceil();
    let total_sample_size_99 = per_variation_99 * variations;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed());

    let sizes = build_sample_sizes(
        point_count,
        total_sample_size_99,
        days_needed,
        daily_test_visitors,
    );
    let days: Vec<u64> = sizes
        .iter()
        .map(|&s| (s / daily_test_visitors).ceil() as u64)
        .collect();

    // Uncertainty window: a 2-5 day span scaled against daily traffic,
    // capped at 15% of the test, tightened for large expected lifts.
    let uncertainty_days = (days_needed * 0.15).clamp(2.0, 5.0);
    let uncertainty_endpoint = (uncertainty_days * daily_test_visitors).min(total_sample_size);
    let mut uncertainty_share =
        (uncertainty_endpoint / total_sample_size).min(MAX_UNCERTAINTY_SHARE);
    if improvement > 0.15 {
        uncertainty_share *= 0.6;
    }

    let ci_widths: Vec<f64> = sizes
        .iter()
        .map(|&n| z_a * (p * (1.0 - p) / (n / variations)).sqrt())
        .collect();

    let initial_confidence_factor = 1.2 + improvement * 0.5;
    let volatility_factor = (1.2 - p).max(0.8);
    let phase1_end = uncertainty_share * 0.4;
    let phase2_end = uncertainty_share;

    let mut confidence_values: Vec<f64> = Vec::with_capacity(sizes.len());
    for &n in &sizes {
        let std_error = (2.0 * p * (1.0 - p) / (n / variations)).sqrt();
        let non_centrality = mde / std_error;
        let base_confidence = normal_power(non_centrality, z_a) * 100.0;

        let progress = n / total_sample_size;

        let value = if progress < phase1_end {
            // Phase 1: inflated confidence with heavy decaying noise.
            let inflated = (base_confidence * 2.0 * initial_confidence_factor).clamp(70.0, 98.0);
            let volatility = (20.0 * volatility_factor * (1.0 - progress / phase1_end)).max(0.0);
            (inflated + gaussian_noise(&mut rng, volatility)).clamp(60.0, 100.0)
        } else if progress < phase2_end {
            // Phase 2: drop toward the true value, steeper with more variations.
            let drop_rate = (0.6 + 0.1 * (variations - 2.0)).min(0.8);
            let drop_factor =
                1.0 - (progress - phase1_end) / (phase2_end - phase1_end) * drop_rate;
            let dropped = base_confidence * drop_factor;
            let volatility = (8.0
                * volatility_factor
                * (1.0 - (progress - phase1_end) / (phase2_end - phase1_end)))
                .max(0.0);
            (dropped + gaussian_noise(&mut rng, volatility)).clamp(30.0, 95.0)
        } else {
            // Phase 3: recovery toward the true value, faster for big lifts.
            let progress_to_final = (progress - phase2_end) / (1.0 - phase2_end);
            let recovery_rate = (0.3 + improvement).min(0.7);
            let recovered =
                base_confidence * ((1.0 - recovery_rate) + recovery_rate * progress_to_final);
            let volatility = (3.0 * volatility_factor * (1.0 - progress_to_final)).max(0.0);
            let floor = base_confidence * (1.0 - recovery_rate);
            (recovered + gaussian_noise(&mut rng, volatility)).clamp(floor, 100.0)
        };

        confidence_values.push(value);
    }

    smooth_in_place(&mut confidence_values);

    // Anchor the curve: the point nearest the computed requirement reads
    // exactly the requested confidence.
    let anchor_index = sizes
        .iter()
        .position(|&n| n >= total_sample_size)
        .unwrap_or(sizes.len().saturating_sub(1));
    if anchor_index > 0 && anchor_index < confidence_values.len() {
        confidence_values[anchor_index] = confidence;
    }

    let target_index = confidence_values
        .iter()
        .position(|&c| c >= confidence)
        .unwrap_or(confidence_values.len().saturating_sub(1));
    let target_99_index = confidence_values
        .iter()
        .position(|&c| c >= 99.0)
        .unwrap_or(confidence_values.len().saturating_sub(1));

    let mut points_by_sample = Vec::with_capacity(sizes.len());
    for i in 0..sizes.len() {
        points_by_sample.push(TrajectoryPoint {
            sample_size: sizes[i] as u64,
            day: days[i],
            confidence: confidence_values[i],
            ci_width: ci_widths[i],
            is_uncertainty: i < target_index && confidence_values[i] < confidence,
        });
    }
    // Days are unique and ascending, so the day view shares the order.
    let points_by_day = points_by_sample.clone();

    let pick = |index: usize, fallback: f64| -> (Bound, Bound) {
        match points_by_sample.get(index) {
            Some(point) => (Bound::Finite(point.sample_size), Bound::Finite(point.day)),
            None => (
                Bound::Finite(fallback as u64),
                Bound::Finite(days_needed as u64),
            ),
        }
    };
    let (target_sample_size, target_day) = pick(target_index, total_sample_size);
    let (target_99_sample_size, target_99_day) = pick(target_99_index, total_sample_size_99);

    ConfidenceTrajectory {
        points_by_sample,
        points_by_day,
        target_sample_size,
        target_day,
        target_99_sample_size,
        target_99_day,
        total_sample_size: Bound::Finite(total_sample_size as u64),
        total_days: Bound::Finite(days_needed as u64),
    }
}

fn gaussian_noise(rng: &mut Xoshiro256PlusPlus, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    // Standard deviation is finite and positive here.
    Normal::new(0.0, std_dev)
        .expect("valid noise distribution")
        .sample(rng)
}

/// Build the monotone candidate sample sizes.
///
/// A position-dependent blend of logarithmic and linear spacing gives
/// resolution in the volatile early region without bunching the late
/// points. Candidates collapsing onto an already-used day are dropped;
/// if that discards too many, the set is rebuilt on uniform days and
/// topped up with midpoints of the largest remaining day gaps.
fn build_sample_sizes(
    point_count: usize,
    max_sample: f64,
    days_needed: f64,
    daily_test_visitors: f64,
) -> Vec<f64> {
    let min_sample = (max_sample * 0.01).ceil().max(50.0);

    let mut raw = Vec::with_capacity(point_count);
    for i in 0..point_count {
        let progress = i as f64 / (point_count - 1) as f64;
        let log_value = min_sample * ((max_sample / min_sample).ln() * progress).exp();
        let linear_value = min_sample + (max_sample - min_sample) * progress;
        // More logarithmic early, more linear late.
        let weight = SPACING_BLEND * progress + (1.0 - SPACING_BLEND) * (1.0 - progress);
        raw.push(((1.0 - weight) * log_value + weight * linear_value).ceil());
    }

    // Drop candidates that land on an already-used day.
    let mut seen_days = std::collections::BTreeSet::new();
    let mut filtered = Vec::new();
    for &size in &raw {
        let day = (size / daily_test_visitors).ceil() as i64;
        if day > 0 && seen_days.insert(day) {
            filtered.push(size);
        }
    }

    let mut sizes: Vec<f64> = if (filtered.len() as f64) < point_count as f64 * 0.7 {
        // Lost too many points: rebuild on uniformly spaced days instead.
        let mut uniform = Vec::with_capacity(point_count);
        for i in 0..point_count {
            let day = 1.0 + (days_needed - 1.0) * i as f64 / (point_count - 1) as f64;
            uniform.push((day * daily_test_visitors).ceil());
        }
        uniform.sort_by(|a, b| a.total_cmp(b));
        uniform.dedup();
        uniform
    } else {
        filtered.sort_by(|a, b| a.total_cmp(b));
        filtered.truncate(point_count);
        filtered
    };

    // Top up with midpoints of the largest day gaps until the point or
    // day budget is reached.
    let budget = point_count.min(days_needed.max(1.0) as usize);
    while sizes.len() < budget {
        let days: Vec<i64> = sizes
            .iter()
            .map(|&s| (s / daily_test_visitors).ceil() as i64)
            .collect();
        let mut gaps: Vec<(i64, usize)> = days
            .windows(2)
            .enumerate()
            .map(|(i, w)| (w[1] - w[0], i))
            .collect();
        gaps.sort_by(|a, b| b.0.cmp(&a.0));

        let mut added = false;
        for (gap, index) in gaps {
            if gap <= 1 {
                continue;
            }
            let mid_day = (days[index] + days[index + 1]) / 2;
            if !days.contains(&mid_day) {
                sizes.push(mid_day as f64 * daily_test_visitors);
                added = true;
                if sizes.len() >= budget {
                    break;
                }
            }
        }
        if !added {
            break;
        }
        sizes.sort_by(|a, b| a.total_cmp(b));
    }

    sizes.sort_by(|a, b| a.total_cmp(b));

    // Final pass: the by-day view must have unique days.
    let mut seen_days = std::collections::BTreeSet::new();
    sizes.retain(|&size| {
        let day = (size / daily_test_visitors).ceil() as i64;
        day > 0 && seen_days.insert(day)
    });
    sizes
}

/// Moving-average smoothing with window ≤ 3, padded at the start with the
/// first raw value so the sequence keeps its length.
fn smooth_in_place(values: &mut Vec<f64>) {
    let window = values.len().min(3);
    if window <= 1 {
        return;
    }
    let mut smoothed = Vec::with_capacity(values.len());
    smoothed.extend(std::iter::repeat(values[0]).take(window - 1));
    for chunk in values.windows(window) {
        smoothed.push(chunk.iter().sum::<f64>() / window as f64);
    }
    *values = smoothed;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TestParameters {
        TestParameters::new(1000.0, 100.0, 10.0)
    }

    #[test]
    fn test_identical_inputs_identical_trajectories() {
        let a = simulate_confidence_evolution(&params(), DEFAULT_POINT_COUNT);
        let b = simulate_confidence_evolution(&params(), DEFAULT_POINT_COUNT);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_inputs_different_noise() {
        let a = simulate_confidence_evolution(&params(), DEFAULT_POINT_COUNT);
        let b = simulate_confidence_evolution(&params().variations(3), DEFAULT_POINT_COUNT);
        assert_ne!(a, b);
    }

    #[test]
    fn test_point_bounds_and_ordering() {
        let t = simulate_confidence_evolution(&params(), DEFAULT_POINT_COUNT);
        assert!(!t.points_by_sample.is_empty());
        assert!(t.points_by_sample.len() <= DEFAULT_POINT_COUNT);

        for w in t.points_by_sample.windows(2) {
            assert!(w[0].sample_size <= w[1].sample_size);
            assert!(w[0].day < w[1].day, "duplicate or unordered days");
        }
        for point in &t.points_by_sample {
            assert!((0.0..=100.0).contains(&point.confidence));
            assert!(point.ci_width >= 0.0);
        }
    }

    #[test]
    fn test_day_view_matches_sample_view() {
        let t = simulate_confidence_evolution(&params(), DEFAULT_POINT_COUNT);
        assert_eq!(t.points_by_sample, t.points_by_day);
    }

    #[test]
    fn test_anchor_point_reads_requested_confidence() {
        let p = params();
        let t = simulate_confidence_evolution(&p, DEFAULT_POINT_COUNT);
        let total = t.total_sample_size.finite().unwrap();

        let anchor = t
            .points_by_sample
            .iter()
            .find(|point| point.sample_size >= total);
        if let Some(anchor) = anchor {
            // Only interior anchors are forced to the nominal value.
            let idx = t
                .points_by_sample
                .iter()
                .position(|q| q.sample_size == anchor.sample_size)
                .unwrap();
            if idx > 0 {
                assert!((anchor.confidence - p.confidence_percent).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_uncertainty_flags_precede_target() {
        let p = params();
        let t = simulate_confidence_evolution(&p, DEFAULT_POINT_COUNT);
        let mut past_flagged_region = false;
        for point in &t.points_by_sample {
            if point.is_uncertainty {
                assert!(
                    !past_flagged_region,
                    "uncertainty flag after a non-flagged target point"
                );
                assert!(point.confidence < p.confidence_percent);
            } else if point.confidence >= p.confidence_percent {
                past_flagged_region = true;
            }
        }
    }

    #[test]
    fn test_degenerate_inputs_yield_empty_trajectory() {
        let zero_conversions = TestParameters::new(1000.0, 0.0, 10.0);
        let t = simulate_confidence_evolution(&zero_conversions, DEFAULT_POINT_COUNT);
        assert_eq!(t, ConfidenceTrajectory::degenerate());

        let mut zero_traffic = params();
        zero_traffic.traffic_percent = 0.0;
        let t = simulate_confidence_evolution(&zero_traffic, DEFAULT_POINT_COUNT);
        assert_eq!(t, ConfidenceTrajectory::degenerate());
    }

    #[test]
    fn test_totals_match_frequentist_formula() {
        let t = simulate_confidence_evolution(&params(), DEFAULT_POINT_COUNT);
        assert_eq!(t.total_sample_size, Bound::Finite(28_256));
        assert_eq!(t.total_days, Bound::Finite(29));
    }

    #[test]
    fn test_ci_width_decreases_with_sample_size() {
        let t = simulate_confidence_evolution(&params(), DEFAULT_POINT_COUNT);
        for w in t.points_by_sample.windows(2) {
            if w[0].sample_size < w[1].sample_size {
                assert!(w[0].ci_width > w[1].ci_width);
            }
        }
    }

    #[test]
    fn test_smoothing_preserves_length() {
        let mut values = vec![10.0, 20.0, 30.0, 40.0];
        smooth_in_place(&mut values);
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], 10.0);
        assert_eq!(values[1], 10.0);
        assert!((values[2] - 20.0).abs() < 1e-12);
        assert!((values[3] - 30.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic]
    fn test_rejects_single_point_request() {
        simulate_confidence_evolution(&params(), 1);
    }
}
