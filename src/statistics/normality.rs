//! Shapiro–Wilk normality test (Royston AS R94).
//!
//! Gates the selection between Welch's t-test and Mann–Whitney U for
//! continuous metrics. Follows Royston's approximation:
//!
//! 1. Coefficients from expected normal order statistics (Blom).
//! 2. `W = (Σ aᵢ x₍ᵢ₎)² / Σ (xᵢ − x̄)²`.
//! 3. Transform W to a z-score (gamma/log-normal depending on n) and read
//!    the p-value off the standard normal.
//!
//! Above 5,000 points the test becomes oversensitive (and the
//! approximation is only calibrated to that size), so larger samples are
//! subsampled without replacement with a fixed seed before testing.
//!
//! # References
//!
//! - Shapiro & Wilk (1965). "An analysis of variance test for normality".
//! - Royston (1995). "Remark AS R94". Applied Statistics, 44(4), 547–551.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::statistics::normal::{normal_cdf, z_quantile};

/// Largest sample passed to the W statistic; bigger inputs are subsampled.
const MAX_TEST_SIZE: usize = 5_000;

/// Fixed seed for the subsampling draw, so repeated analyses of the same
/// data agree.
const SUBSAMPLE_SEED: u64 = 42;

/// Result of one Shapiro–Wilk run.
#[derive(Debug, Clone, Copy)]
pub struct ShapiroWilk {
    /// The W statistic in (0, 1]; values near 1 look normal.
    pub w: f64,
    /// p-value for the null hypothesis of normality.
    pub p_value: f64,
}

/// Decide whether `data` looks normally distributed at level `alpha`.
///
/// Fewer than three points cannot be tested and are treated as
/// non-normal, which routes the caller to the rank-based test. Samples
/// larger than 5,000 are deterministically subsampled first.
pub fn is_normally_distributed(data: &[f64], alpha: f64) -> bool {
    if data.len() < 3 {
        return false;
    }

    let result = if data.len() > MAX_TEST_SIZE {
        let subsample = subsample_fixed_seed(data, MAX_TEST_SIZE);
        shapiro_wilk(&subsample)
    } else {
        shapiro_wilk(data)
    };

    match result {
        Some(r) => r.p_value > alpha,
        // Degenerate data (constant, non-finite): treat as non-normal.
        None => false,
    }
}

/// Draw `count` points without replacement using the fixed seed.
fn subsample_fixed_seed(data: &[f64], count: usize) -> Vec<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(SUBSAMPLE_SEED);
    rand::seq::index::sample(&mut rng, data.len(), count)
        .into_iter()
        .map(|i| data[i])
        .collect()
}

/// Run the W test on 3 ≤ n ≤ 5,000 points.
///
/// Returns `None` when the statistic is undefined: out-of-range n,
/// non-finite values, or a zero-spread sample.
pub fn shapiro_wilk(data: &[f64]) -> Option<ShapiroWilk> {
    let n = data.len();
    if !(3..=MAX_TEST_SIZE).contains(&n) {
        return None;
    }
    if data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut x = data.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));

    if x[n - 1] - x[0] < 1e-300 {
        return None;
    }

    if n == 3 {
        return shapiro_wilk_n3(&x);
    }

    let nn2 = n / 2;
    let a = coefficients(n, nn2)?;
    let w = w_statistic(&x, &a, n, nn2);
    if !(0.0..=1.0 + 1e-10).contains(&w) {
        return None;
    }
    let w = w.min(1.0);

    Some(ShapiroWilk {
        w,
        p_value: p_value(w, n).clamp(0.0, 1.0),
    })
}

// n = 3 has an exact distribution.
fn shapiro_wilk_n3(x: &[f64]) -> Option<ShapiroWilk> {
    let a1 = std::f64::consts::FRAC_1_SQRT_2;
    let mean = (x[0] + x[1] + x[2]) / 3.0;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    if ss < 1e-300 {
        return None;
    }
    let num = a1 * (x[2] - x[0]);
    let w = ((num * num) / ss).clamp(0.75, 1.0);
    let p = (1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos()).clamp(0.0, 1.0);
    Some(ShapiroWilk { w, p_value: p })
}

// Royston polynomial coefficients (AS R94).
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

fn poly(c: &[f64], x: f64) -> f64 {
    let mut result = c[c.len() - 1];
    for i in (0..c.len() - 1).rev() {
        result = result * x + c[i];
    }
    result
}

fn coefficients(n: usize, nn2: usize) -> Option<Vec<f64>> {
    let mut a = vec![0.0; nn2];

    // Blom approximation of expected normal order statistics.
    let mut m = vec![0.0; nn2];
    let mut summ2 = 0.0;
    for (i, mi) in m.iter_mut().enumerate() {
        let p = (i as f64 + 1.0 - 0.375) / (n as f64 + 0.25);
        *mi = z_quantile(p);
        summ2 += *mi * *mi;
    }
    summ2 *= 2.0;
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    if n <= 5 {
        let fac_sq = summ2 - 2.0 * m[0] * m[0];
        let one_minus = 1.0 - 2.0 * a1 * a1;
        if fac_sq <= 0.0 || one_minus <= 0.0 {
            return None;
        }
        let fac = (fac_sq / one_minus).sqrt();
        a[0] = a1;
        for i in 1..nn2 {
            a[i] = -m[i] / fac;
        }
    } else {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac_sq = summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1];
        let one_minus = 1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2;
        if fac_sq <= 0.0 || one_minus <= 0.0 {
            return None;
        }
        let fac = (fac_sq / one_minus).sqrt();
        a[0] = a1;
        a[1] = a2;
        for i in 2..nn2 {
            a[i] = -m[i] / fac;
        }
    }

    Some(a)
}

fn w_statistic(x: &[f64], a: &[f64], n: usize, nn2: usize) -> f64 {
    let mut sa = 0.0;
    for i in 0..nn2 {
        sa += a[i] * (x[n - 1 - i] - x[i]);
    }

    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    if ss < 1e-300 {
        return 1.0;
    }

    (sa * sa) / ss
}

fn p_value(w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        let y2 = -(gamma - y).ln();
        let m = poly(&C3, nf);
        let s = poly(&C4, nf).exp();
        if s < 1e-300 {
            return 0.0;
        }
        1.0 - normal_cdf((y2 - m) / s)
    } else {
        let xx = nf.ln();
        let m = poly(&C5, xx);
        let s = poly(&C6, xx).exp();
        if s < 1e-300 {
            return 0.0;
        }
        1.0 - normal_cdf((y - m) / s)
    }
}
