//! # abtest-engine
//!
//! Statistical engines for planning and analyzing online experiments
//! (A/B tests):
//!
//! - **Duration estimation** under two paradigms: a closed-form
//!   frequentist two-proportion power analysis, and a Bayesian
//!   Beta–Binomial Monte-Carlo search for the smallest sample size
//!   reaching a target posterior probability of improvement.
//! - **Confidence evolution simulation**: a chart-ready, seeded
//!   projection of how measured confidence and interval width plausibly
//!   move over a running test, including the misleading early-sample
//!   inflation phase.
//! - **Collected-data analysis**: descriptive statistics, outlier
//!   handling, automatic hypothesis-test selection (z / Welch-t /
//!   Mann–Whitney, with a bootstrap path for revenue totals), and
//!   human-readable interpretations.
//!
//! All entry points are pure functions over their inputs: no I/O, no
//! logging, no shared state. Wherever randomness is involved it comes
//! from a locally owned generator seeded from the inputs, so identical
//! requests produce identical results.
//!
//! ## Quick start
//!
//! ```
//! use abtest_engine::{estimate_frequentist, TestParameters};
//!
//! let params = TestParameters::new(1000.0, 100.0, 10.0);
//! params.validate().unwrap();
//!
//! let estimate = estimate_frequentist(&params);
//! println!("run for {} days ({} subjects)", estimate.days, estimate.min_sample_size);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod params;
mod types;

pub mod analysis;
pub mod statistics;

pub use analysis::{
    analyze_experiment, analyze_metric, estimate_bayesian, estimate_frequentist,
    select_and_run_test, select_test, simulate_confidence_evolution, ExperimentReport,
    DEFAULT_ALPHA, DEFAULT_POINT_COUNT,
};
pub use error::EngineError;
pub use params::TestParameters;
pub use statistics::{
    analyze_samples, detect_outliers, OutlierMethod, SampleAnalysis, SummaryStatistics,
};
pub use types::{
    Bound, ConfidenceTrajectory, DurationEstimate, MetricResult, MetricType, TestResult,
    TestSelection, TrajectoryPoint,
};
