//! Midrank assignment with tie accounting.
//!
//! The Mann–Whitney executor needs average ranks over the pooled sample
//! and the tie term `Σ (tⱼ³ − tⱼ)` for its variance correction.

/// Ranks (1-based, ties averaged) and the accumulated tie correction.
#[derive(Debug, Clone)]
pub struct RankedPool {
    /// Average rank per element, parallel to the sorted input.
    pub ranks: Vec<f64>,
    /// `Σ (t³ − t)` over all tie groups.
    pub tie_correction: f64,
}

/// Assign midranks to an ascending-sorted slice.
///
/// # Panics
///
/// Debug-asserts that the input is sorted.
pub fn midranks_sorted(sorted: &[f64]) -> RankedPool {
    debug_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));

    let n = sorted.len();
    let mut ranks = vec![0.0; n];
    let mut tie_correction = 0.0;

    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && sorted[j + 1] == sorted[i] {
            j += 1;
        }
        // Tie group spans [i, j]; its members share the average rank.
        let avg_rank = ((i + 1) + (j + 1)) as f64 / 2.0;
        for rank in ranks.iter_mut().take(j + 1).skip(i) {
            *rank = avg_rank;
        }
        let t = (j - i + 1) as f64;
        if t > 1.0 {
            tie_correction += t * t * t - t;
        }
        i = j + 1;
    }

    RankedPool {
        ranks,
        tie_correction,
    }
}
