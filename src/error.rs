//! Configuration errors.
//!
//! Only constructors fail. Runtime operations (attach, navigate, swipe,
//! detach) degrade to no-ops instead of returning errors.

use thiserror::Error;

/// Reasons a tracker or controller configuration is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("invalid root margin `{0}`")]
    InvalidRootMargin(String),

    #[error("{name} interval must be non-zero")]
    ZeroInterval { name: &'static str },

    #[error("swipe threshold must be a non-negative number, got {0}")]
    InvalidSwipeThreshold(f32),

    #[error("tilt range must be a non-negative number, got {0}")]
    InvalidTiltRange(f32),
}

/// Validate a visibility threshold (fraction of element area).
pub(crate) fn check_threshold(threshold: f32) -> Result<f32, ConfigError> {
    if threshold.is_nan() || !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::InvalidThreshold(threshold));
    }
    Ok(threshold)
}
