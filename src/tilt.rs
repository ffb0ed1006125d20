//! Tilt angles - stable per-card rotation for scrapbook layouts
//!
//! Angles are drawn from a seeded RNG, so the same `(count, range, seed)`
//! always yields the same layout across renders and test runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;

/// Full spread of tilt angles in degrees (-4 to +4).
pub const DEFAULT_TILT_RANGE: f32 = 8.0;

/// Rotation angle per card index, in degrees.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TiltAngles {
    angles: Vec<f32>,
}

impl TiltAngles {
    /// Angle for card `index`; untilted (0.0) past the end.
    pub fn get(&self, index: usize) -> f32 {
        self.angles.get(index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.angles
    }
}

/// Assign `count` angles uniformly within `[-range/2, range/2)`.
///
/// A zero, invalid or subnormal-small range yields all-zero angles.
pub fn assign_angles(count: usize, range_degrees: f32, seed: u64) -> TiltAngles {
    let half = range_degrees / 2.0;
    // `half` underflows to zero for the tiniest positive ranges
    if !(half.is_finite() && half > 0.0) {
        return TiltAngles {
            angles: vec![0.0; count],
        };
    }

    let mut rng = StdRng::seed_from_u64(seed);
    TiltAngles {
        angles: (0..count).map(|_| rng.gen_range(-half..half)).collect(),
    }
}

/// [`assign_angles`] that rejects a negative or non-finite range.
pub fn try_assign_angles(
    count: usize,
    range_degrees: f32,
    seed: u64,
) -> Result<TiltAngles, ConfigError> {
    if !range_degrees.is_finite() || range_degrees < 0.0 {
        return Err(ConfigError::InvalidTiltRange(range_degrees));
    }
    Ok(assign_angles(count, range_degrees, seed))
}
