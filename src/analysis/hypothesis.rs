//! Hypothesis test executors.
//!
//! Three two-sample tests share one result shape: pooled-proportion
//! z-test, Welch's unequal-variance t-test, and the Mann–Whitney U rank
//! test with tie and continuity corrections. Each reports a two-sided
//! p-value, an effect size, and an asymptotic power estimate.
//!
//! Power uses the normal approximation throughout: the non-centrality is
//! `effect × √(n₁n₂/(n₁+n₂))` and the achieved power is
//! `Φ(nc − z) + Φ(−nc − z)` at the two-sided critical value. For the
//! rank test no closed form exists, so the p-value is transformed back
//! to an equivalent z-statistic and evaluated against the same formula.
//! That is a deliberate approximation, not an exact rank-test power.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::statistics::normal::{normal_cdf, normal_power, z_quantile};
use crate::statistics::{mean, midranks_sorted, sample_variance};
use crate::types::{TestResult, TestSelection};

/// Run the test `selection` names on the two samples.
pub fn run_test(
    control: &[f64],
    variation: &[f64],
    selection: TestSelection,
    alpha: f64,
) -> TestResult {
    match selection {
        TestSelection::ZTest => z_test(control, variation, alpha),
        TestSelection::TTest => welch_t_test(control, variation, alpha),
        TestSelection::MannWhitney => mann_whitney_u(control, variation, alpha),
    }
}

fn finish(
    test: TestSelection,
    p_value: f64,
    effect_size: f64,
    power: Option<f64>,
    alpha: f64,
) -> TestResult {
    let p_value = p_value.clamp(0.0, 1.0);
    TestResult {
        test,
        p_value,
        confidence: (1.0 - p_value) * 100.0,
        significant: p_value < alpha,
        effect_size,
        power,
    }
}

/// The defined outcome for samples too thin to test: no evidence, no power.
fn insufficient(test: TestSelection, alpha: f64) -> TestResult {
    finish(test, 1.0, 0.0, None, alpha)
}

/// Two-sided critical value at level `alpha`.
fn z_crit(alpha: f64) -> f64 {
    z_quantile(1.0 - alpha / 2.0)
}

/// Normal-approximation power at a standardized effect and sample split.
fn approximate_power(effect_size: f64, n1: usize, n2: usize, alpha: f64) -> Option<f64> {
    if n1 == 0 || n2 == 0 || !effect_size.is_finite() {
        return None;
    }
    let (n1, n2) = (n1 as f64, n2 as f64);
    let non_centrality = effect_size.abs() * (n1 * n2 / (n1 + n2)).sqrt();
    Some(normal_power(non_centrality, z_crit(alpha)).clamp(0.0, 1.0))
}

/// Pooled two-proportion z-test.
///
/// Inputs are 0/1 arrays; the group means are the conversion rates. A
/// zero pooled standard error (both rates 0 or both 1) degenerates to
/// z = 0, p = 1 rather than a division fault.
pub fn z_test(control: &[f64], variation: &[f64], alpha: f64) -> TestResult {
    let (n1, n2) = (control.len(), variation.len());
    if n1 == 0 || n2 == 0 {
        return insufficient(TestSelection::ZTest, alpha);
    }

    let p1 = mean(control);
    let p2 = mean(variation);
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let pooled = (p1 * n1f + p2 * n2f) / (n1f + n2f);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1f + 1.0 / n2f)).sqrt();

    let (p_value, effect_size) = if se == 0.0 {
        (1.0, 0.0)
    } else {
        let z = (p2 - p1) / se;
        let p_value = 2.0 * (1.0 - normal_cdf(z.abs()));
        let effect_size = (p2 - p1) / (pooled * (1.0 - pooled)).sqrt();
        (p_value, effect_size)
    };

    let power = approximate_power(effect_size, n1, n2, alpha);
    finish(TestSelection::ZTest, p_value, effect_size, power, alpha)
}

/// Welch's unequal-variance two-sample t-test.
///
/// Degrees of freedom follow Welch–Satterthwaite; the effect size is
/// Cohen's d over the pooled standard deviation.
pub fn welch_t_test(control: &[f64], variation: &[f64], alpha: f64) -> TestResult {
    let (n1, n2) = (control.len(), variation.len());
    if n1 < 2 || n2 < 2 {
        return insufficient(TestSelection::TTest, alpha);
    }

    let (m1, m2) = (mean(control), mean(variation));
    let (v1, v2) = (sample_variance(control), sample_variance(variation));
    let (n1f, n2f) = (n1 as f64, n2 as f64);

    let se_sq = v1 / n1f + v2 / n2f;
    if se_sq == 0.0 {
        // Two constant, equal-variance-free samples: no detectable spread.
        return insufficient(TestSelection::TTest, alpha);
    }

    let t = (m2 - m1) / se_sq.sqrt();
    let df = se_sq * se_sq
        / ((v1 / n1f).powi(2) / (n1f - 1.0) + (v2 / n2f).powi(2) / (n2f - 1.0));

    // df ≥ min(n1, n2) − 1 ≥ 1 whenever se² > 0.
    let dist = StudentsT::new(0.0, 1.0, df).expect("valid Welch degrees of freedom");
    let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));

    let pooled_sd =
        (((n1f - 1.0) * v1 + (n2f - 1.0) * v2) / (n1f + n2f - 2.0)).sqrt();
    let effect_size = if pooled_sd == 0.0 {
        0.0
    } else {
        (m2 - m1).abs() / pooled_sd
    };

    let power = approximate_power(effect_size, n1, n2, alpha);
    finish(TestSelection::TTest, p_value, effect_size, power, alpha)
}

/// Mann–Whitney U test (two-sided, normal approximation).
///
/// Uses midranks with tie correction and a 0.5 continuity correction.
/// The effect size is the rank-biserial correlation `1 − 2U/(n₁n₂)`.
pub fn mann_whitney_u(control: &[f64], variation: &[f64], alpha: f64) -> TestResult {
    let (n1, n2) = (control.len(), variation.len());
    if n1 < 2 || n2 < 2 {
        return insufficient(TestSelection::MannWhitney, alpha);
    }
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let nf = n1f + n2f;

    let mut pooled: Vec<(f64, bool)> = control
        .iter()
        .map(|&v| (v, true))
        .chain(variation.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let sorted_values: Vec<f64> = pooled.iter().map(|&(v, _)| v).collect();
    let ranked = midranks_sorted(&sorted_values);

    let r1: f64 = pooled
        .iter()
        .zip(&ranked.ranks)
        .filter(|((_, is_control), _)| *is_control)
        .map(|(_, &rank)| rank)
        .sum();
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;

    let mu = n1f * n2f / 2.0;
    let sigma_sq =
        n1f * n2f / 12.0 * (nf + 1.0 - ranked.tie_correction / (nf * (nf - 1.0)));
    if sigma_sq <= 0.0 {
        // All values tied: the rank distribution carries no information.
        return finish(
            TestSelection::MannWhitney,
            1.0,
            1.0 - 2.0 * u1 / (n1f * n2f),
            None,
            alpha,
        );
    }

    let z = ((u1 - mu).abs() - 0.5).max(0.0) / sigma_sq.sqrt();
    let p_value = (2.0 * (1.0 - normal_cdf(z))).min(1.0);
    let effect_size = 1.0 - 2.0 * u1 / (n1f * n2f);

    // Approximate power: transform p back to an equivalent z-statistic and
    // evaluate it against the normal power formula.
    let equivalent_z = z_quantile((1.0 - p_value / 2.0).clamp(0.5, 1.0 - 1e-16));
    let power = Some(normal_power(equivalent_z, z_crit(alpha)).clamp(0.0, 1.0));

    finish(TestSelection::MannWhitney, p_value, effect_size, power, alpha)
}
