//! SIMD-accelerated dense kernel using the `wide` crate.
//!
//! The inner template row loop is vectorized to process 8 samples at a time
//! using `f32x8`. Each lane accumulates products of two `u8` values over at
//! most `MAX_EXACT_WIDTH / 8` steps, which stays below 2^24 and is therefore
//! exact in `f32`; lanes are flushed into a `u64` after every row. Wider
//! templates fall back to the scalar kernel.

use crate::kernel::scalar::ZnccDenseScalar;
use crate::kernel::Kernel;
use crate::template::TemplatePlan;
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

/// Widest template row whose per-lane sums are exact in `f32`.
const MAX_EXACT_WIDTH: usize = 2048;

/// Load 8 u8 values and convert to f32x8.
#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

/// Exact horizontal sum of lanes holding integral values.
#[inline]
fn hsum_exact(v: f32x8) -> u64 {
    v.to_array().iter().map(|&lane| lane as u64).sum()
}

/// SIMD-accelerated dense kernel.
pub struct ZnccDenseSimd;

impl Kernel for ZnccDenseSimd {
    #[inline]
    fn cross_at(image: ImageView<'_, u8>, tpl: &TemplatePlan, x: usize, y: usize) -> u64 {
        let tpl_width = tpl.width();
        if tpl_width > MAX_EXACT_WIDTH {
            return ZnccDenseScalar::cross_at(image, tpl, x, y);
        }

        let samples = tpl.samples();
        let simd_end = tpl_width / LANES * LANES;
        let mut cross = 0u64;

        for ty in 0..tpl.height() {
            let img_row = &image.row(y + ty).expect("row within bounds for scan")[x..];
            let tpl_row = &samples[ty * tpl_width..(ty + 1) * tpl_width];

            let mut acc = f32x8::ZERO;
            let mut tx = 0;
            while tx < simd_end {
                let img_vals = load_u8x8_as_f32x8(&img_row[tx..]);
                let tpl_vals = load_u8x8_as_f32x8(&tpl_row[tx..]);
                acc += tpl_vals * img_vals;
                tx += LANES;
            }
            cross += hsum_exact(acc);

            // Scalar remainder
            while tx < tpl_width {
                cross += u64::from(u32::from(tpl_row[tx]) * u32::from(img_row[tx]));
                tx += 1;
            }
        }

        cross
    }
}
