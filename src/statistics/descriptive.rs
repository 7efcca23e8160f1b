//! Descriptive statistics and outlier detection.
//!
//! These feed the test selector and the sample-analysis entry point:
//! per-group summary records, IQR / z-score outlier masks, and the
//! outlier-aware `analyze_samples` operation.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Method used to flag outliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Tukey fences: outside `[Q1 − k·IQR, Q3 + k·IQR]`. Conventional k = 1.5.
    Iqr,
    /// Standard-score threshold: `|x − mean| / std > k`. Conventional k = 3.
    ZScore,
}

impl std::str::FromStr for OutlierMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iqr" => Ok(OutlierMethod::Iqr),
            "zscore" => Ok(OutlierMethod::ZScore),
            other => Err(EngineError::UnsupportedOption {
                what: "outlier detection method",
                value: other.to_string(),
            }),
        }
    }
}

/// Descriptive summary of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Number of data points.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (Type 7 / linear interpolation).
    pub median: f64,
    /// Sample standard deviation (ddof = 1).
    pub std_dev: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Number of IQR outliers at threshold 1.5.
    pub outlier_count: usize,
}

impl SummaryStatistics {
    /// The defined result for an empty sample: all fields zero.
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            outlier_count: 0,
        }
    }
}

/// Outcome of `analyze_samples`: both summaries, a user-facing message,
/// and whether any outliers were seen in the raw data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleAnalysis {
    /// Summary of the control group (post-filtering if exclusion was on).
    pub control: SummaryStatistics,
    /// Summary of the variation group (post-filtering if exclusion was on).
    pub variation: SummaryStatistics,
    /// Human-readable description of what was found and done.
    pub message: String,
    /// Whether the unfiltered data contained outliers.
    pub has_outliers: bool,
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance with ddof = 1; 0 when fewer than two points.
pub fn sample_variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64
}

/// Sample standard deviation with ddof = 1.
pub fn sample_std_dev(data: &[f64]) -> f64 {
    sample_variance(data).sqrt()
}

/// Linear-interpolation percentile on a sorted slice, `p` in [0, 100].
///
/// Matches the conventional Type 7 definition, so quartiles line up with
/// what the chart layer computes elsewhere.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Median via sort + Type 7 percentile; 0 for an empty slice.
pub fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, 50.0)
}

/// Flag outliers in `data`, returning a parallel boolean mask.
///
/// IQR uses Tukey fences at `threshold` (1.5 conventionally); z-score
/// flags points whose standard score exceeds `threshold` (3 conventionally).
/// A zero-spread sample produces an all-false mask rather than dividing
/// by zero.
pub fn detect_outliers(data: &[f64], method: OutlierMethod, threshold: f64) -> Vec<bool> {
    match method {
        OutlierMethod::Iqr => {
            let mut sorted = data.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let q1 = percentile_sorted(&sorted, 25.0);
            let q3 = percentile_sorted(&sorted, 75.0);
            let iqr = q3 - q1;
            let lower = q1 - threshold * iqr;
            let upper = q3 + threshold * iqr;
            data.iter().map(|&x| x < lower || x > upper).collect()
        }
        OutlierMethod::ZScore => {
            let m = mean(data);
            // Population std here, matching the usual z-score convention.
            let n = data.len().max(1) as f64;
            let var = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
            let sd = var.sqrt();
            if sd == 0.0 {
                return vec![false; data.len()];
            }
            data.iter().map(|&x| ((x - m) / sd).abs() > threshold).collect()
        }
    }
}

/// Compute the summary record for one sample.
pub fn summarize(data: &[f64]) -> SummaryStatistics {
    if data.is_empty() {
        return SummaryStatistics::empty();
    }
    let outliers = detect_outliers(data, OutlierMethod::Iqr, 1.5);
    SummaryStatistics {
        count: data.len(),
        mean: mean(data),
        median: median(data),
        std_dev: sample_std_dev(data),
        min: data.iter().copied().fold(f64::INFINITY, f64::min),
        max: data.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        outlier_count: outliers.iter().filter(|&&o| o).count(),
    }
}

/// Keep only the entries whose mask value is false.
pub fn filter_outliers(data: &[f64], mask: &[bool]) -> Vec<f64> {
    data.iter()
        .zip(mask)
        .filter(|(_, &flagged)| !flagged)
        .map(|(&x, _)| x)
        .collect()
}

/// Summarize both groups, flag outliers, and optionally exclude them.
///
/// When `exclude_outliers` is set and outliers exist, the summaries are
/// recomputed on the filtered data; `has_outliers` still reports on the
/// raw input. The message mirrors what the request layer shows users.
pub fn analyze_samples(
    control: &[f64],
    variation: &[f64],
    exclude_outliers: bool,
) -> SampleAnalysis {
    let control_stats = summarize(control);
    let variation_stats = summarize(variation);

    let total_outliers = control_stats.outlier_count + variation_stats.outlier_count;
    let has_outliers = total_outliers > 0;

    let mut message = format!(
        "Analysis summary: Found {} control transactions and {} variation transactions. ",
        control.len(),
        variation.len()
    );

    if exclude_outliers && has_outliers {
        let control_mask = detect_outliers(control, OutlierMethod::Iqr, 1.5);
        let variation_mask = detect_outliers(variation, OutlierMethod::Iqr, 1.5);
        let filtered_control = filter_outliers(control, &control_mask);
        let filtered_variation = filter_outliers(variation, &variation_mask);

        message.push_str(&format!(
            "Excluded {} outliers from analysis. Now using {} control and {} variation data points.",
            total_outliers,
            filtered_control.len(),
            filtered_variation.len()
        ));

        return SampleAnalysis {
            control: summarize(&filtered_control),
            variation: summarize(&filtered_variation),
            message,
            has_outliers,
        };
    }

    if has_outliers {
        message.push_str(&format!(
            "Detected {} outliers in the data. Consider using the 'exclude outliers' \
             option for more robust analysis.",
            total_outliers
        ));
    } else {
        message.push_str("No outliers detected in the data.");
    }

    SampleAnalysis {
        control: control_stats,
        variation: variation_stats,
        message,
        has_outliers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_basic() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let s = summarize(&data);
        assert_eq!(s.count, 5);
        assert!((s.mean - 3.0).abs() < 1e-12);
        assert!((s.median - 3.0).abs() < 1e-12);
        assert!((s.std_dev - 1.5811388).abs() < 1e-6);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.outlier_count, 0);
    }

    #[test]
    fn test_summarize_empty_is_defined() {
        let s = summarize(&[]);
        assert_eq!(s, SummaryStatistics::empty());
    }

    #[test]
    fn test_iqr_outlier_detection() {
        let mut data = vec![10.0; 20];
        data.extend_from_slice(&[10.1, 9.9, 1000.0]);
        let mask = detect_outliers(&data, OutlierMethod::Iqr, 1.5);
        assert!(mask[data.len() - 1]);
        assert_eq!(mask.iter().filter(|&&o| o).count(), 3);
    }

    #[test]
    fn test_zscore_outlier_detection() {
        let mut data: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        data.push(1e6);
        let mask = detect_outliers(&data, OutlierMethod::ZScore, 3.0);
        assert!(mask[100]);
        assert_eq!(mask.iter().filter(|&&o| o).count(), 1);
    }

    #[test]
    fn test_zscore_zero_spread() {
        let data = [5.0; 10];
        let mask = detect_outliers(&data, OutlierMethod::ZScore, 3.0);
        assert!(mask.iter().all(|&o| !o));
    }

    #[test]
    fn test_outlier_method_parsing() {
        assert_eq!("iqr".parse::<OutlierMethod>().unwrap(), OutlierMethod::Iqr);
        assert!("mad".parse::<OutlierMethod>().is_err());
    }

    #[test]
    fn test_analyze_samples_without_outliers() {
        let control = [1.0, 2.0, 3.0, 4.0, 5.0];
        let variation = [2.0, 3.0, 4.0, 5.0, 6.0];
        let analysis = analyze_samples(&control, &variation, true);

        assert!(!analysis.has_outliers);
        // Exclusion requested but nothing flagged: summaries match the raw data.
        assert_eq!(analysis.control.count, 5);
        assert_eq!(analysis.variation.count, 5);
        assert!(analysis.message.contains("No outliers detected"));
    }

    #[test]
    fn test_analyze_samples_excluding_outliers() {
        let mut control = vec![10.0; 30];
        control.push(1e5);
        let variation = vec![11.0; 30];

        let analysis = analyze_samples(&control, &variation, true);
        assert!(analysis.has_outliers);
        assert_eq!(analysis.control.count, 30);
        assert!(analysis.message.contains("Excluded 1 outliers"));
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile_sorted(&sorted, 25.0) - 1.75).abs() < 1e-12);
        assert!((percentile_sorted(&sorted, 75.0) - 3.25).abs() < 1e-12);
        assert!((percentile_sorted(&sorted, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile_sorted(&sorted, 100.0) - 4.0).abs() < 1e-12);
    }
}
