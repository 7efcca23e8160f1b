//! Result value types shared across the engines.
//!
//! Everything here is produced once per call, immutable afterwards, and
//! serde-serializable so the surrounding request layer can encode it
//! without reshaping.

use serde::{Deserialize, Serialize};

/// A sample-size or day count that may be unbounded.
///
/// Degenerate inputs (zero minimum detectable effect, zero daily test
/// visitors, infeasible Bayesian targets) produce `Unbounded` instead of
/// NaN, infinity, or a magic large number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Bound {
    /// A finite count.
    Finite(u64),
    /// No finite count satisfies the request.
    Unbounded,
}

impl Bound {
    /// The finite value, if any.
    pub fn finite(self) -> Option<u64> {
        match self {
            Bound::Finite(v) => Some(v),
            Bound::Unbounded => None,
        }
    }

    /// Whether this bound is the unbounded sentinel.
    pub fn is_unbounded(self) -> bool {
        matches!(self, Bound::Unbounded)
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Finite(v) => write!(f, "{v}"),
            Bound::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// How long the experiment must run, and with how many subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationEstimate {
    /// Days until the test can reach the requested confidence.
    pub days: Bound,
    /// Minimum total sample size across all variations.
    pub min_sample_size: Bound,
}

impl DurationEstimate {
    /// The sentinel estimate for infeasible or degenerate requests.
    pub fn unbounded() -> Self {
        Self {
            days: Bound::Unbounded,
            min_sample_size: Bound::Unbounded,
        }
    }
}

/// One point of a simulated confidence trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Cumulative sample size at this point.
    pub sample_size: u64,
    /// Day the test reaches this sample size.
    pub day: u64,
    /// Simulated confidence in percent, within [0, 100].
    pub confidence: f64,
    /// Confidence interval half-width for the conversion rate.
    pub ci_width: f64,
    /// Whether the point still sits inside the early uncertainty window.
    pub is_uncertainty: bool,
}

/// Simulated evolution of confidence over a running test.
///
/// Two parallel views of the same points are provided: keyed by sample
/// size and keyed by day. Days are unique and strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceTrajectory {
    /// Points ordered by sample size.
    pub points_by_sample: Vec<TrajectoryPoint>,
    /// The same points ordered by day.
    pub points_by_day: Vec<TrajectoryPoint>,
    /// Sample size of the first point reaching the requested confidence.
    pub target_sample_size: Bound,
    /// Day of the first point reaching the requested confidence.
    pub target_day: Bound,
    /// Sample size of the first point reaching 99% confidence.
    pub target_99_sample_size: Bound,
    /// Day of the first point reaching 99% confidence.
    pub target_99_day: Bound,
    /// Total sample size required at the requested confidence.
    pub total_sample_size: Bound,
    /// Total days required at the requested confidence.
    pub total_days: Bound,
}

impl ConfidenceTrajectory {
    /// The empty trajectory returned for degenerate inputs.
    pub fn degenerate() -> Self {
        Self {
            points_by_sample: Vec::new(),
            points_by_day: Vec::new(),
            target_sample_size: Bound::Unbounded,
            target_day: Bound::Unbounded,
            target_99_sample_size: Bound::Unbounded,
            target_99_day: Bound::Unbounded,
            total_sample_size: Bound::Unbounded,
            total_days: Bound::Unbounded,
        }
    }
}

/// Kind of metric under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Binary conversion outcome (0/1 per subject).
    Conversion,
    /// Total revenue (sum of per-transaction values).
    Revenue,
    /// Average order value (mean of per-transaction values).
    Aov,
}

impl MetricType {
    /// Lowercase name used in interpretation text.
    pub fn name(self) -> &'static str {
        match self {
            MetricType::Conversion => "conversion",
            MetricType::Revenue => "revenue",
            MetricType::Aov => "aov",
        }
    }
}

impl std::str::FromStr for MetricType {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conversion" => Ok(MetricType::Conversion),
            "revenue" => Ok(MetricType::Revenue),
            "aov" => Ok(MetricType::Aov),
            other => Err(crate::error::EngineError::UnsupportedOption {
                what: "metric type",
                value: other.to_string(),
            }),
        }
    }
}

/// Which hypothesis test was selected for a pair of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestSelection {
    /// Pooled two-proportion z-test.
    ZTest,
    /// Welch's unequal-variance t-test.
    TTest,
    /// Mann–Whitney U rank test.
    MannWhitney,
}

impl TestSelection {
    /// The conventional test name, as reported to callers.
    pub fn name(self) -> &'static str {
        match self {
            TestSelection::ZTest => "z-test",
            TestSelection::TTest => "t-test",
            TestSelection::MannWhitney => "mann-whitney",
        }
    }
}

/// Outcome of one hypothesis test execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Which test ran.
    pub test: TestSelection,
    /// Two-sided p-value in [0, 1].
    pub p_value: f64,
    /// Confidence in percent, `(1 − p) × 100`.
    pub confidence: f64,
    /// Whether `p < alpha`.
    pub significant: bool,
    /// Estimated effect size (standardized difference, Cohen's d, or
    /// rank-biserial correlation depending on the test).
    pub effect_size: f64,
    /// Achieved power in [0, 1], `None` when the power formula degenerates.
    pub power: Option<f64>,
}

/// Per-metric analysis outcome composed from the samples and a test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// The analyzed metric.
    pub metric: MetricType,
    /// Control group value (rate, mean, or sum).
    pub control_value: f64,
    /// Variation group value (rate, mean, or sum).
    pub variation_value: f64,
    /// Relative uplift of the variation over control, in percent.
    pub uplift_percent: f64,
    /// The executed hypothesis test.
    pub test_result: TestResult,
    /// Human-readable reading of the outcome.
    pub interpretation: String,
}
