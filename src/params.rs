//! Input parameters for duration estimation and trajectory simulation.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Parameters describing the planned experiment.
///
/// All estimators and the confidence-evolution simulator consume this one
/// value type. Percentages are expressed as percentages (e.g. `95.0` for a
/// 95% confidence level), mirroring what the request layer collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParameters {
    /// Daily visits to the site.
    pub daily_visits: f64,
    /// Daily conversions. Must not exceed `daily_visits`.
    pub daily_conversions: f64,
    /// Share of traffic included in the test, in (0, 100].
    pub traffic_percent: f64,
    /// Number of variations including control. At least 2.
    pub variations: u32,
    /// Expected relative improvement of the conversion rate, in percent (> 0).
    pub improvement_percent: f64,
    /// Target statistical confidence, in [80, 99.9].
    pub confidence_percent: f64,
}

impl TestParameters {
    /// Create parameters with the most common defaults (2 variations,
    /// full traffic, 95% confidence).
    pub fn new(daily_visits: f64, daily_conversions: f64, improvement_percent: f64) -> Self {
        Self {
            daily_visits,
            daily_conversions,
            traffic_percent: 100.0,
            variations: 2,
            improvement_percent,
            confidence_percent: 95.0,
        }
    }

    /// Set the tested traffic share in percent.
    pub fn traffic_percent(mut self, traffic: f64) -> Self {
        self.traffic_percent = traffic;
        self
    }

    /// Set the number of variations (including control).
    pub fn variations(mut self, variations: u32) -> Self {
        self.variations = variations;
        self
    }

    /// Set the target confidence level in percent.
    pub fn confidence_percent(mut self, confidence: f64) -> Self {
        self.confidence_percent = confidence;
        self
    }

    /// Baseline conversion rate `conversions / visits`.
    ///
    /// Callers must ensure `daily_visits > 0`; `validate()` enforces it.
    pub fn baseline_rate(&self) -> f64 {
        self.daily_conversions / self.daily_visits
    }

    /// Tested traffic as a fraction in (0, 1].
    pub fn traffic_fraction(&self) -> f64 {
        self.traffic_percent / 100.0
    }

    /// Expected relative improvement as a fraction.
    pub fn improvement_fraction(&self) -> f64 {
        self.improvement_percent / 100.0
    }

    /// Visitors entering the test per day: `visits × traffic fraction`.
    pub fn daily_test_visitors(&self) -> f64 {
        self.daily_visits * self.traffic_fraction()
    }

    /// Check all documented parameter ranges.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.daily_visits > 0.0) {
            return Err(EngineError::invalid("daily_visits", "must be positive"));
        }
        if self.daily_conversions < 0.0 {
            return Err(EngineError::invalid(
                "daily_conversions",
                "must be non-negative",
            ));
        }
        if self.daily_conversions > self.daily_visits {
            return Err(EngineError::invalid(
                "daily_conversions",
                "must not exceed daily_visits",
            ));
        }
        if !(self.traffic_percent > 0.0 && self.traffic_percent <= 100.0) {
            return Err(EngineError::invalid(
                "traffic_percent",
                "must be in (0, 100]",
            ));
        }
        if self.variations < 2 {
            return Err(EngineError::invalid("variations", "need at least 2"));
        }
        if !(self.improvement_percent > 0.0) {
            return Err(EngineError::invalid(
                "improvement_percent",
                "must be positive",
            ));
        }
        if !(80.0..=99.9).contains(&self.confidence_percent) {
            return Err(EngineError::invalid(
                "confidence_percent",
                "must be in [80, 99.9]",
            ));
        }
        Ok(())
    }

    /// Deterministic seed derived from the six input parameters.
    ///
    /// Identical parameters always map to the same seed, so every seeded
    /// computation (trajectory noise, Bayesian posterior draws) is
    /// reproducible per request while staying independent across requests.
    pub fn seed(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.daily_visits.to_bits().hash(&mut hasher);
        self.daily_conversions.to_bits().hash(&mut hasher);
        self.traffic_percent.to_bits().hash(&mut hasher);
        self.variations.hash(&mut hasher);
        self.improvement_percent.to_bits().hash(&mut hasher);
        self.confidence_percent.to_bits().hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TestParameters {
        TestParameters::new(1000.0, 100.0, 10.0)
    }

    #[test]
    fn test_valid_parameters() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_derived_quantities() {
        let p = valid().traffic_percent(50.0);
        assert!((p.baseline_rate() - 0.1).abs() < 1e-12);
        assert!((p.traffic_fraction() - 0.5).abs() < 1e-12);
        assert!((p.daily_test_visitors() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_conversions_exceeding_visits_rejected() {
        let mut p = valid();
        p.daily_conversions = 2000.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_variation_count_floor() {
        let p = valid().variations(1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_confidence_range() {
        assert!(valid().confidence_percent(79.9).validate().is_err());
        assert!(valid().confidence_percent(99.91).validate().is_err());
        assert!(valid().confidence_percent(80.0).validate().is_ok());
        assert!(valid().confidence_percent(99.9).validate().is_ok());
    }

    #[test]
    fn test_seed_is_stable_and_parameter_sensitive() {
        let a = valid();
        let b = valid();
        assert_eq!(a.seed(), b.seed());

        let c = valid().variations(3);
        assert_ne!(a.seed(), c.seed());
    }
}
