//! Edge-domain transform applied to both target and template.
//!
//! Matching runs on structural outline rather than raw intensity, which makes
//! scores insensitive to color scheme, anti-aliasing and brightness or theme
//! differences between the capture contexts of template and target.

mod blur;
mod canny;

pub use blur::gaussian_blur_3x3;
pub use canny::{canny, EDGE};

use crate::image::{ImageView, OwnedImage};
#[cfg(feature = "tracing")]
use crate::trace::trace_event;
use crate::trace::trace_span;
use crate::util::{ScaleMatchError, ScaleMatchResult};

/// Configuration for the edge transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeConfig {
    /// Apply 3×3 Gaussian smoothing before edge detection.
    pub blur: bool,
    /// Hysteresis threshold for continuing an edge.
    pub low_threshold: f32,
    /// Hysteresis threshold for starting an edge.
    pub high_threshold: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            blur: true,
            low_threshold: 50.0,
            high_threshold: 150.0,
        }
    }
}

impl EdgeConfig {
    /// Checks that both thresholds are finite, non-negative and ordered.
    pub fn validate(&self) -> ScaleMatchResult<()> {
        if !self.low_threshold.is_finite() || !self.high_threshold.is_finite() {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "edge thresholds must be finite",
            });
        }
        if self.low_threshold < 0.0 {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "edge thresholds must be non-negative",
            });
        }
        if self.low_threshold > self.high_threshold {
            return Err(ScaleMatchError::InvalidConfig {
                reason: "low edge threshold must not exceed the high threshold",
            });
        }
        Ok(())
    }
}

/// Converts a grayscale image into an edge map of identical dimensions.
///
/// Edge pixels are [`EDGE`], everything else is zero.
pub fn edge_map(image: ImageView<'_, u8>, cfg: &EdgeConfig) -> ScaleMatchResult<OwnedImage> {
    cfg.validate()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ScaleMatchError::InvalidImage {
            reason: format!("zero-area image ({}x{})", image.width(), image.height()),
        });
    }

    let _span = trace_span!("edge_map", width = image.width(), height = image.height()).entered();
    let edges = if cfg.blur {
        let smoothed = gaussian_blur_3x3(image)?;
        canny(smoothed.view(), cfg.low_threshold, cfg.high_threshold)?
    } else {
        canny(image, cfg.low_threshold, cfg.high_threshold)?
    };

    // Full scan of the map; only run it when the event is recorded.
    #[cfg(feature = "tracing")]
    trace_event!(
        "edge_pixels",
        count = edges.data().iter().filter(|&&v| v == EDGE).count()
    );
    Ok(edges)
}
