//! Tunables for bounding-box computation and hit testing.
//!
//! ```json
//! { "curve_samples": 48, "polyline_tolerance": 4.0 }
//! ```
//!
//! Missing fields take their defaults, so `{}` is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Curves are never sampled coarser than this.
pub const MIN_CURVE_SAMPLES: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Steps per curve, arc or ellipse segment when sampling.
    pub curve_samples: usize,
    /// Stroke hit distance for open polylines, in world units.
    pub polyline_tolerance: f32,
    /// Guard for degenerate geometry (zero-length segments, singular matrices).
    pub epsilon: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            curve_samples: 32,
            polyline_tolerance: 3.0,
            epsilon: 1e-6,
        }
    }
}

impl SpatialConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sampling resolution with the lower bound applied.
    pub fn samples(&self) -> usize {
        self.curve_samples.max(MIN_CURVE_SAMPLES)
    }
}
