//! Correlation kernel implementations.
//!
//! Every kernel computes the same zero-mean normalized cross-correlation
//!
//! ```text
//! zncc = (n·Σti - Σt·Σi) / sqrt((n·Σt² - (Σt)²) · (n·Σi² - (Σi)²))
//! ```
//!
//! Window sums come from an [`IntegralImage`]; kernels only differ in how
//! they evaluate the cross term `Σti`, which is an exact integer. Scores lie
//! in `[-1, 1]`. A flat template or a flat window scores `0.0`.

use crate::candidate::peak::{BestPeak, Peak};
use crate::image::integral::{IntegralImage, WindowSums};
use crate::template::TemplatePlan;
use crate::util::{ScaleMatchError, ScaleMatchResult};
use crate::ImageView;

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanParams {
    /// Windows whose sum of squared deviations is at or below this value
    /// score zero.
    pub min_var_i: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self { min_var_i: 1e-8 }
    }
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    /// Computes `Σ t·i` for the window with top-left `(x, y)`.
    ///
    /// The window must lie inside `image`.
    fn cross_at(image: ImageView<'_, u8>, tpl: &TemplatePlan, x: usize, y: usize) -> u64;

    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// Placements that do not fit inside the image score `-inf`.
    fn score_at(
        image: ImageView<'_, u8>,
        sums: &IntegralImage,
        tpl: &TemplatePlan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> f32 {
        if !fits(image, tpl) || x > image.width() - tpl.width() || y > image.height() - tpl.height()
        {
            return f32::NEG_INFINITY;
        }
        let window = sums.window(x, y, tpl.width(), tpl.height());
        zncc_from_parts(tpl, window, Self::cross_at(image, tpl, x, y), params)
    }

    /// Scans every valid placement and returns the first maximum in raster
    /// order.
    fn scan_best(
        image: ImageView<'_, u8>,
        sums: &IntegralImage,
        tpl: &TemplatePlan,
        params: ScanParams,
    ) -> ScaleMatchResult<Peak> {
        check_fit(image, tpl)?;
        let tpl_width = tpl.width();
        let tpl_height = tpl.height();
        let max_x = image.width() - tpl_width;
        let max_y = image.height() - tpl_height;

        let mut best = BestPeak::new();
        for y in 0..=max_y {
            for x in 0..=max_x {
                let score = if tpl.is_flat() {
                    0.0
                } else {
                    let window = sums.window(x, y, tpl_width, tpl_height);
                    zncc_from_parts(tpl, window, Self::cross_at(image, tpl, x, y), params)
                };
                best.push(x, y, score);
            }
        }

        Ok(best
            .into_peak()
            .expect("at least one placement exists when the template fits"))
    }
}

/// Combines window sums and the cross term into a ZNCC score.
#[inline]
pub(crate) fn zncc_from_parts(
    tpl: &TemplatePlan,
    window: WindowSums,
    cross: u64,
    params: ScanParams,
) -> f32 {
    let n = tpl.len() as u128;
    let sum_i = u128::from(window.sum);
    let var_i_num = n * u128::from(window.sum_sq) - sum_i * sum_i;
    let var_t_num = tpl.var_num();
    if var_t_num == 0 || var_i_num as f64 / n as f64 <= params.min_var_i {
        return 0.0;
    }

    let num = (n * u128::from(cross)) as i128 - (u128::from(tpl.sum()) * sum_i) as i128;
    let denom = (var_t_num as f64 * var_i_num as f64).sqrt();
    let score = num as f64 / denom;
    if score.is_finite() {
        score.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

fn fits(image: ImageView<'_, u8>, tpl: &TemplatePlan) -> bool {
    image.width() >= tpl.width() && image.height() >= tpl.height()
}

fn check_fit(image: ImageView<'_, u8>, tpl: &TemplatePlan) -> ScaleMatchResult<()> {
    if fits(image, tpl) {
        return Ok(());
    }
    Err(ScaleMatchError::RoiOutOfBounds {
        x: 0,
        y: 0,
        width: tpl.width(),
        height: tpl.height(),
        img_width: image.width(),
        img_height: image.height(),
    })
}
