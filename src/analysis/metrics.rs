//! Per-metric orchestration: selection, execution, uplift, interpretation.
//!
//! Conversion metrics run the z-test straight on the 0/1 samples. AOV
//! runs the normality-gated selection on the raw values. Revenue is a
//! single total per group, which cannot be tested directly, so the
//! executor first rebuilds a sampling distribution of the totals with a
//! seeded bootstrap and applies the gated selection to the replicate
//! distributions.

use crate::analysis::hypothesis::run_test;
use crate::analysis::selector::select_test;
use crate::statistics::{bootstrap_totals, mean, BOOTSTRAP_SEED, DEFAULT_REPLICATES};
use crate::types::{MetricResult, MetricType, TestResult, TestSelection};

/// Conventional significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Select and execute the appropriate test for this metric.
pub fn select_and_run_test(
    control: &[f64],
    variation: &[f64],
    metric: MetricType,
    alpha: f64,
) -> TestResult {
    match metric {
        MetricType::Conversion => run_test(control, variation, TestSelection::ZTest, alpha),
        MetricType::Aov => {
            let selection = select_test(control, variation, metric);
            run_test(control, variation, selection, alpha)
        }
        MetricType::Revenue => {
            let control_totals = bootstrap_totals(control, DEFAULT_REPLICATES, BOOTSTRAP_SEED);
            let variation_totals =
                bootstrap_totals(variation, DEFAULT_REPLICATES, BOOTSTRAP_SEED);
            // The replicate distributions are continuous; gate them the
            // same way as AOV values.
            let selection = select_test(&control_totals, &variation_totals, MetricType::Aov);
            run_test(&control_totals, &variation_totals, selection, alpha)
        }
    }
}

/// The headline value for one group under a given metric.
fn metric_value(data: &[f64], metric: MetricType) -> f64 {
    match metric {
        // 0/1 samples: the mean is the conversion rate.
        MetricType::Conversion => mean(data),
        MetricType::Aov => mean(data),
        MetricType::Revenue => data.iter().sum(),
    }
}

/// Relative uplift of variation over control, in percent.
///
/// A zero control with a positive variation has no finite uplift and
/// reports infinity; two zeros report zero.
fn uplift_percent(control_value: f64, variation_value: f64) -> f64 {
    if control_value == 0.0 {
        if variation_value > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        (variation_value - control_value) / control_value * 100.0
    }
}

/// Full per-metric analysis: values, uplift, test, interpretation.
pub fn analyze_metric(
    control: &[f64],
    variation: &[f64],
    metric: MetricType,
    alpha: f64,
) -> MetricResult {
    let control_value = metric_value(control, metric);
    let variation_value = metric_value(variation, metric);
    let uplift = uplift_percent(control_value, variation_value);

    let test_result = select_and_run_test(control, variation, metric, alpha);
    let interpretation = interpret(metric, uplift, &test_result);

    MetricResult {
        metric,
        control_value,
        variation_value,
        uplift_percent: uplift,
        test_result,
        interpretation,
    }
}

/// Compose the human-readable reading of one metric's outcome.
///
/// Four phrasing branches: significant with adequate or low power, and
/// non-significant with or without a power caveat.
fn interpret(metric: MetricType, uplift: f64, result: &TestResult) -> String {
    let name = metric.name();
    let power = result.power.unwrap_or(0.0);

    if result.significant {
        let direction = if uplift > 0.0 { "higher" } else { "lower" };
        let mut text = format!(
            "The {name} for the variation is {:.2}% {direction} than the control, \
             which is statistically significant (confidence: {:.2}%). ",
            uplift.abs(),
            result.confidence
        );
        if power < 0.8 {
            text.push_str(&format!(
                "However, the statistical power is only {power:.2}, which is below the \
                 recommended 0.8. More data may be needed for reliable results."
            ));
        } else {
            text.push_str(&format!(
                "The statistical power is {power:.2}, which is sufficient for reliable results."
            ));
        }
        text
    } else {
        let mut text = format!(
            "The {uplift:.2}% difference in {name} between control and variation \
             is not statistically significant (confidence: {:.2}%). ",
            result.confidence
        );
        if power < 0.8 {
            text.push_str(&format!(
                "The test has low statistical power ({power:.2}). More data may be \
                 needed to detect a significant difference if one exists."
            ));
        }
        text
    }
}
