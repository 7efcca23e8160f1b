//! The estimation and analysis engines.
//!
//! - Frequentist and Bayesian duration estimation
//! - Confidence evolution simulation
//! - Hypothesis test selection, execution, and per-metric reporting

pub mod bayesian;
pub mod evolution;
pub mod frequentist;
pub mod hypothesis;
pub mod metrics;
pub mod report;
pub mod selector;

pub use bayesian::estimate_bayesian;
pub use evolution::{simulate_confidence_evolution, DEFAULT_POINT_COUNT};
pub use frequentist::estimate_frequentist;
pub use hypothesis::{mann_whitney_u, run_test, welch_t_test, z_test};
pub use metrics::{analyze_metric, select_and_run_test, DEFAULT_ALPHA};
pub use report::{analyze_experiment, ExperimentReport};
pub use selector::select_test;
