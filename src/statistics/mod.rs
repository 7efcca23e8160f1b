//! Statistical building blocks for the estimation and analysis engines.
//!
//! This module provides the numeric infrastructure the engines share:
//! - Standard normal quantile/CDF wrappers
//! - Descriptive statistics and outlier detection
//! - Shapiro–Wilk normality testing with deterministic subsampling
//! - Midrank assignment for the rank-based test
//! - Seeded bootstrap resampling of group totals

mod bootstrap;
mod descriptive;
pub mod normal;
mod normality;
mod rank;

pub use bootstrap::{bootstrap_totals, BOOTSTRAP_SEED, DEFAULT_REPLICATES};
pub use descriptive::{
    analyze_samples, detect_outliers, filter_outliers, mean, median, percentile_sorted,
    sample_std_dev, sample_variance, summarize, OutlierMethod, SampleAnalysis, SummaryStatistics,
};
pub use normal::{normal_cdf, normal_power, z_alpha, z_beta_80, z_quantile};
pub use normality::{is_normally_distributed, shapiro_wilk, ShapiroWilk};
pub use rank::{midranks_sorted, RankedPool};
