//! Hypothesis test selection.
//!
//! Conversion metrics are proportions and always take the z-test. For
//! continuous metrics (revenue, AOV) the choice hinges on a Shapiro–Wilk
//! normality check of each group independently: both normal means
//! Welch's t-test, anything else means Mann–Whitney U.

use crate::statistics::is_normally_distributed;
use crate::types::{MetricType, TestSelection};

/// Significance level used by the normality gate.
const NORMALITY_ALPHA: f64 = 0.05;

/// Pick the test appropriate for this metric and these samples.
pub fn select_test(control: &[f64], variation: &[f64], metric: MetricType) -> TestSelection {
    if metric == MetricType::Conversion {
        return TestSelection::ZTest;
    }

    let control_normal = is_normally_distributed(control, NORMALITY_ALPHA);
    let variation_normal = is_normally_distributed(variation, NORMALITY_ALPHA);

    if control_normal && variation_normal {
        TestSelection::TTest
    } else {
        TestSelection::MannWhitney
    }
}
