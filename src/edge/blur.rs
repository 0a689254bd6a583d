//! 3×3 Gaussian smoothing.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::reflect_101;
use crate::util::ScaleMatchResult;

/// Binomial taps of the 3-tap Gaussian; the 2D kernel sums to 16.
const TAPS: [u32; 3] = [1, 2, 1];

/// Smooths with the separable `[1, 2, 1] / 4` kernel and reflect-101 borders.
///
/// Accumulation is exact in integers and the result is rounded half up, so
/// the output depends only on the input samples.
pub fn gaussian_blur_3x3(src: ImageView<'_, u8>) -> ScaleMatchResult<OwnedImage> {
    let width = src.width();
    let height = src.height();

    let mut horiz = vec![0u32; width * height];
    for y in 0..height {
        let row = src.row(y).expect("row within validated view");
        for x in 0..width {
            let mut acc = 0u32;
            for (k, &w) in TAPS.iter().enumerate() {
                let sx = reflect_101(x as isize + k as isize - 1, width);
                acc += w * u32::from(row[sx]);
            }
            horiz[y * width + x] = acc;
        }
    }

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0u32;
            for (k, &w) in TAPS.iter().enumerate() {
                let sy = reflect_101(y as isize + k as isize - 1, height);
                acc += w * horiz[sy * width + x];
            }
            out[y * width + x] = ((acc + 8) >> 4) as u8;
        }
    }

    OwnedImage::new(out, width, height)
}
