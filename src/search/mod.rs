//! Scale-space search for the best template placement.
//!
//! The template edge map is resized to every scale of a [`ScaleRange`] and
//! correlated against the fixed target edge map. Each scale contributes its
//! best placement; the global best is the highest-scoring one, with the lower
//! scale winning exact ties.

use crate::util::math::scaled_len;
use crate::util::{ScaleMatchError, ScaleMatchResult};
use std::time::Duration;

mod sweep;

pub use sweep::{best_match, scale_sweep};

/// Tolerance that keeps `max_scale` reachable despite rounding in
/// `min_scale + i * step`.
pub const SCALE_EPSILON: f64 = 1e-9;

/// Upper bound on the number of scale factors in a [`ScaleRange`].
pub const MAX_SCALES: usize = 10_000;

/// Density below which [`KernelChoice::Auto`] uses the sparse kernel.
pub const AUTO_SPARSE_DENSITY: f32 = 0.5;

/// Inclusive range of template scale factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleRange {
    /// Smallest scale factor tried.
    pub min_scale: f64,
    /// Largest scale factor tried (inclusive).
    pub max_scale: f64,
    /// Increment between consecutive scale factors.
    pub step: f64,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self {
            min_scale: 0.4,
            max_scale: 1.6,
            step: 0.05,
        }
    }
}

impl ScaleRange {
    /// Checks that the range is finite, positive, non-empty and holds at most
    /// [`MAX_SCALES`] factors.
    pub fn validate(&self) -> ScaleMatchResult<()> {
        if !self.min_scale.is_finite() || !self.max_scale.is_finite() || !self.step.is_finite() {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "scale range values must be finite",
            });
        }
        if self.min_scale <= 0.0 {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "min_scale must be > 0",
            });
        }
        if self.step <= 0.0 {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "scale step must be > 0",
            });
        }
        if self.max_scale < self.min_scale {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "max_scale must not be below min_scale",
            });
        }
        let count = ((self.max_scale - self.min_scale) / self.step).floor() + 1.0;
        if !count.is_finite() || count > MAX_SCALES as f64 {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "scale range exceeds 10000 factors",
            });
        }
        Ok(())
    }

    /// Returns the scale factors in ascending order.
    ///
    /// Factors are computed as `min_scale + i * step` rather than by repeated
    /// addition, and `max_scale` is included within [`SCALE_EPSILON`]. At most
    /// [`MAX_SCALES`] factors are returned.
    pub fn scales(&self) -> Vec<f64> {
        let mut out = Vec::new();
        loop {
            let scale = self.min_scale + out.len() as f64 * self.step;
            if scale > self.max_scale + SCALE_EPSILON || out.len() >= MAX_SCALES {
                break;
            }
            out.push(scale);
        }
        out
    }
}

/// Which correlation kernel evaluates the cross term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KernelChoice {
    /// Sparse for templates below [`AUTO_SPARSE_DENSITY`], dense otherwise.
    #[default]
    Auto,
    /// Always multiply every template sample.
    Dense,
    /// Always visit only nonzero template samples.
    Sparse,
}

/// Configuration for the scale sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Scale factors to try.
    pub scales: ScaleRange,
    /// Kernel selection for the cross term.
    pub kernel: KernelChoice,
    /// Evaluate scales on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
    /// Minimum resized template side in pixels.
    pub min_template_size: usize,
    /// Windows whose sum of squared deviations is at or below this value
    /// score zero.
    pub min_var_i: f64,
    /// Scales that would start after this much wall-clock time are skipped.
    /// The first scale that fits is always evaluated.
    pub time_budget: Option<Duration>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            scales: ScaleRange::default(),
            kernel: KernelChoice::Auto,
            parallel: false,
            min_template_size: 2,
            min_var_i: 1e-8,
            time_budget: None,
        }
    }
}

impl MatchConfig {
    /// Checks the scale range and size floor.
    pub fn validate(&self) -> ScaleMatchResult<()> {
        self.scales.validate()?;
        if self.min_template_size == 0 {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "min_template_size must be >= 1",
            });
        }
        if !self.min_var_i.is_finite() || self.min_var_i < 0.0 {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "min_var_i must be finite and non-negative",
            });
        }
        Ok(())
    }
}

/// Best placement found for one scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchCandidate {
    /// ZNCC score in `[-1, 1]`.
    pub score: f32,
    /// Scale factor applied to the template.
    pub scale: f64,
    /// Resized template width.
    pub width: usize,
    /// Resized template height.
    pub height: usize,
    /// Left edge of the window in target coordinates.
    pub x: usize,
    /// Top edge of the window in target coordinates.
    pub y: usize,
}

/// Record of a complete scale sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleSweep {
    /// Highest-scoring candidate over all evaluated scales.
    pub best: MatchCandidate,
    /// One candidate per evaluated scale, in ascending scale order.
    pub per_scale: Vec<MatchCandidate>,
    /// Number of scales whose footprint did not fit inside the target.
    pub skipped: usize,
    /// True when the time budget cut the sweep short.
    pub truncated: bool,
}

/// Resized template footprint for `scale`, each side floored at `min_size`.
pub fn footprint(width: usize, height: usize, scale: f64, min_size: usize) -> (usize, usize) {
    (
        scaled_len(width, scale, min_size),
        scaled_len(height, scale, min_size),
    )
}
