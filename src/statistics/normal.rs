//! Standard normal quantile and CDF wrappers.
//!
//! Every engine in this crate reduces to the standard normal at some
//! point: z-values for confidence levels, asymptotic power formulas, and
//! p-values for the z-approximated rank test. Centralizing the two
//! functions here keeps the statrs dependency at one seam.

use statrs::distribution::{ContinuousCDF, Normal};

fn standard_normal() -> Normal {
    // Unit normal parameters are always valid.
    Normal::new(0.0, 1.0).expect("standard normal is well-defined")
}

/// Inverse CDF (quantile) of the standard normal, `Φ⁻¹(p)`.
///
/// # Panics
///
/// Panics if `p` is outside (0, 1).
pub fn z_quantile(p: f64) -> f64 {
    assert!(p > 0.0 && p < 1.0, "quantile probability must be in (0, 1)");
    standard_normal().inverse_cdf(p)
}

/// CDF of the standard normal, `Φ(x)`.
pub fn normal_cdf(x: f64) -> f64 {
    standard_normal().cdf(x)
}

/// Two-sided z critical value for a confidence level given in percent.
///
/// `z_alpha(95.0)` is the familiar 1.96.
pub fn z_alpha(confidence_percent: f64) -> f64 {
    let alpha = 1.0 - confidence_percent / 100.0;
    z_quantile(1.0 - alpha / 2.0)
}

/// z-value for the conventional 80% power target.
pub fn z_beta_80() -> f64 {
    z_quantile(0.8)
}

/// Asymptotic two-sided power of a normal test with non-centrality `nc`
/// at critical value `z_crit`: `Φ(nc − z) + Φ(−nc − z)`.
pub fn normal_power(non_centrality: f64, z_crit: f64) -> f64 {
    normal_cdf(non_centrality - z_crit) + normal_cdf(-non_centrality - z_crit)
}
