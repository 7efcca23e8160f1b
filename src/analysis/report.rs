//! Whole-experiment report.
//!
//! Bundles the three metric analyses with descriptive interpretation
//! bullets and an overall key-findings message, operating purely on the
//! cleaned numeric samples the I/O layer hands over.

use serde::{Deserialize, Serialize};

use crate::analysis::metrics::analyze_metric;
use crate::statistics::{
    analyze_samples, detect_outliers, filter_outliers, OutlierMethod, SampleAnalysis,
    SummaryStatistics,
};
use crate::types::{MetricResult, MetricType};

/// Complete analysis of one experiment's collected data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Summary statistics and outlier handling for both groups.
    pub sample_analysis: SampleAnalysis,
    /// Descriptive observations about the two distributions.
    pub basic_interpretation: Vec<String>,
    /// Conversion metric outcome (samples as 0/1 arrays).
    pub conversion: MetricResult,
    /// Average order value outcome.
    pub aov: MetricResult,
    /// Total revenue outcome (bootstrap path).
    pub revenue: MetricResult,
    /// Overall message summarizing significant findings.
    pub message: String,
}

/// Build the 0/1 conversion sample for one group: a one per recorded
/// transaction, padded with zeros up to the visitor count.
fn binary_conversions(transactions: usize, users: usize) -> Vec<f64> {
    let converted = transactions.min(users);
    let mut sample = vec![1.0; converted];
    sample.resize(users.max(transactions), 0.0);
    sample
}

/// Run the full analysis over both groups.
///
/// `control` and `variation` hold one value per recorded transaction;
/// `users_control` and `users_variation` are the visitor totals the
/// transactions were drawn from, needed to turn transaction counts into
/// conversion rates. When `exclude_outliers` is set, the metric analyses
/// run on the IQR-filtered data; the summary message still reports how
/// many points were dropped.
pub fn analyze_experiment(
    control: &[f64],
    variation: &[f64],
    users_control: usize,
    users_variation: usize,
    exclude_outliers: bool,
    alpha: f64,
) -> ExperimentReport {
    let sample_analysis = analyze_samples(control, variation, exclude_outliers);

    let (control_clean, variation_clean) = if exclude_outliers && sample_analysis.has_outliers {
        let control_mask = detect_outliers(control, OutlierMethod::Iqr, 1.5);
        let variation_mask = detect_outliers(variation, OutlierMethod::Iqr, 1.5);
        (
            filter_outliers(control, &control_mask),
            filter_outliers(variation, &variation_mask),
        )
    } else {
        (control.to_vec(), variation.to_vec())
    };
    let excluded = control.len() + variation.len() - control_clean.len() - variation_clean.len();

    let basic_interpretation =
        describe_distributions(&sample_analysis.control, &sample_analysis.variation);

    let control_binary = binary_conversions(control_clean.len(), users_control);
    let variation_binary = binary_conversions(variation_clean.len(), users_variation);
    let conversion = analyze_metric(
        &control_binary,
        &variation_binary,
        MetricType::Conversion,
        alpha,
    );
    let aov = analyze_metric(&control_clean, &variation_clean, MetricType::Aov, alpha);
    let revenue = analyze_metric(&control_clean, &variation_clean, MetricType::Revenue, alpha);

    let mut message = format!(
        "Analysis complete. Found {} control transactions and {} variation transactions. ",
        control_clean.len(),
        variation_clean.len()
    );
    if sample_analysis.has_outliers {
        if exclude_outliers {
            message.push_str(&format!("Excluded {excluded} outliers from the analysis. "));
        } else {
            message.push_str("Outliers were detected but not excluded from the analysis. ");
        }
    }

    let mut findings = Vec::new();
    for metric in [&conversion, &aov, &revenue] {
        if metric.test_result.significant && metric.uplift_percent.is_finite() {
            let direction = if metric.uplift_percent > 0.0 {
                "higher"
            } else {
                "lower"
            };
            findings.push(format!(
                "{} is {:.2}% {direction} in variation",
                metric.metric.name().to_uppercase(),
                metric.uplift_percent.abs()
            ));
        }
    }
    if findings.is_empty() {
        message.push_str("No statistically significant differences were found.");
    } else {
        message.push_str(&format!("Key findings: {}.", findings.join(", ")));
    }

    ExperimentReport {
        sample_analysis,
        basic_interpretation,
        conversion,
        aov,
        revenue,
        message,
    }
}

/// Descriptive bullets comparing the two distributions: mean gap, skew
/// as read from the mean/median offset, and relative variability.
fn describe_distributions(
    control: &SummaryStatistics,
    variation: &SummaryStatistics,
) -> Vec<String> {
    let mut bullets = Vec::new();
    if control.count == 0 || variation.count == 0 {
        return bullets;
    }

    // Mean comparison.
    if control.mean != 0.0 {
        let mean_diff = (variation.mean - control.mean) / control.mean * 100.0;
        if mean_diff.abs() < 1.0 {
            bullets.push(format!(
                "The average values are very similar between control ({:.2}) and variation \
                 ({:.2}), with only a {:.2}% difference.",
                control.mean,
                variation.mean,
                mean_diff.abs()
            ));
        } else if mean_diff > 0.0 {
            bullets.push(format!(
                "The variation group shows a {:.2}% higher average value ({:.2}) compared \
                 to the control ({:.2}).",
                mean_diff, variation.mean, control.mean
            ));
        } else {
            bullets.push(format!(
                "The variation group shows a {:.2}% lower average value ({:.2}) compared \
                 to the control ({:.2}).",
                mean_diff.abs(),
                variation.mean,
                control.mean
            ));
        }
    }

    // Skew, read from how far the mean sits from the median.
    let skew = |stats: &SummaryStatistics| {
        if stats.std_dev > 0.0 {
            (stats.mean - stats.median) / stats.std_dev
        } else {
            0.0
        }
    };
    let control_skew = skew(control);
    let variation_skew = skew(variation);
    if control_skew.abs() > 0.5 || variation_skew.abs() > 0.5 {
        let description = if control_skew > 0.5 && variation_skew > 0.5 {
            "Both distributions are right-skewed (higher values are pulling up the average)."
                .to_string()
        } else if control_skew < -0.5 && variation_skew < -0.5 {
            "Both distributions are left-skewed (lower values are pulling down the average)."
                .to_string()
        } else if control_skew.abs() > 0.5 {
            format!(
                "The control distribution is {}-skewed.",
                if control_skew > 0.0 { "right" } else { "left" }
            )
        } else {
            format!(
                "The variation distribution is {}-skewed.",
                if variation_skew > 0.0 { "right" } else { "left" }
            )
        };
        bullets.push(format!(
            "The median values ({:.2} vs {:.2}) differ from the means. {}",
            control.median, variation.median, description
        ));
    }

    // Relative variability via the coefficient of variation.
    let cv = |stats: &SummaryStatistics| {
        if stats.mean > 0.0 {
            stats.std_dev / stats.mean
        } else {
            0.0
        }
    };
    let cv_control = cv(control);
    let cv_variation = cv(variation);
    if cv_control > 0.0 && (cv_variation - cv_control).abs() / cv_control > 0.1 {
        if cv_variation > cv_control {
            bullets.push(format!(
                "The variation group shows {:.2}% more variability relative to its mean \
                 compared to the control group. This suggests less consistent behavior.",
                (cv_variation / cv_control - 1.0) * 100.0
            ));
        } else {
            bullets.push(format!(
                "The variation group shows {:.2}% less variability relative to its mean \
                 compared to the control group. This suggests more consistent behavior.",
                (1.0 - cv_variation / cv_control) * 100.0
            ));
        }
    } else {
        bullets.push(format!(
            "Both groups show similar levels of variability relative to their means \
             (coefficient of variation: {:.2} vs {:.2}).",
            cv_control, cv_variation
        ));
    }

    bullets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_contains_all_metrics() {
        let control: Vec<f64> = (0..60).map(|i| 20.0 + (i % 9) as f64).collect();
        let variation: Vec<f64> = (0..75).map(|i| 22.0 + (i % 9) as f64).collect();
        let report = analyze_experiment(&control, &variation, 400, 400, false, 0.05);

        assert_eq!(report.conversion.metric, MetricType::Conversion);
        assert_eq!(report.aov.metric, MetricType::Aov);
        assert_eq!(report.revenue.metric, MetricType::Revenue);
        assert!(!report.basic_interpretation.is_empty());
        assert!(report.message.contains("60 control transactions"));
    }

    #[test]
    fn test_conversion_rate_uses_visitor_counts() {
        let control = vec![10.0; 40];
        let variation = vec![10.0; 80];
        let report = analyze_experiment(&control, &variation, 400, 400, false, 0.05);

        assert!((report.conversion.control_value - 0.1).abs() < 1e-12);
        assert!((report.conversion.variation_value - 0.2).abs() < 1e-12);
        assert!((report.conversion.uplift_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_outlier_exclusion_cleans_metric_inputs() {
        let mut control = vec![10.0; 40];
        control.push(1e6);
        let variation = vec![11.0; 40];
        let report = analyze_experiment(&control, &variation, 200, 200, true, 0.05);

        assert!(report.sample_analysis.has_outliers);
        // The extreme total never reaches the revenue path.
        assert!(report.revenue.control_value < 1000.0);
        assert!(report.message.contains("Excluded 1 outliers"));
    }

    #[test]
    fn test_no_significant_findings_message() {
        let data: Vec<f64> = (0..50).map(|i| 5.0 + (i % 7) as f64).collect();
        let report = analyze_experiment(&data, &data, 300, 300, false, 0.05);
        assert!(report
            .message
            .contains("No statistically significant differences"));
    }

    #[test]
    fn test_skew_bullet_for_skewed_data() {
        // 30% of orders at 11.0, the rest at 1.0: the mean (4.0) sits
        // 0.65 standard deviations above the median (1.0).
        let control: Vec<f64> = (0..200)
            .map(|i| if (i % 10) < 3 { 11.0 } else { 1.0 })
            .collect();
        let variation = control.clone();
        let report = analyze_experiment(&control, &variation, 500, 500, false, 0.05);
        assert!(report
            .basic_interpretation
            .iter()
            .any(|b| b.contains("right-skewed")));
    }
}
