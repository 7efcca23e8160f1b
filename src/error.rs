//! Error taxonomy for the analysis engines.
//!
//! Only caller mistakes surface as errors. Mathematically degenerate
//! intermediates (zero MDE, zero daily traffic, zero standard error) are
//! converted to defined sentinels by the engines themselves, and thin
//! samples downgrade to defined defaults (a normality check on fewer than
//! three points simply reports non-normal).

use thiserror::Error;

/// Errors returned by the public entry points.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// A caller-supplied parameter violates its documented range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An option string does not name a supported variant.
    #[error("unsupported {what}: {value}")]
    UnsupportedOption {
        /// The kind of option (metric type, outlier method, test name).
        what: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl EngineError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
