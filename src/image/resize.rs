//! Separable resampling for grayscale `u8` images.
//!
//! Each axis is resampled independently. An axis that shrinks uses area
//! averaging: every destination sample is the mean of the source interval it
//! covers, weighted by fractional overlap, so thin edge lines fade into lower
//! intensities instead of aliasing away. An axis that grows uses bilinear
//! interpolation with half-pixel centers. An axis that keeps its length is
//! copied. Results are rounded to the nearest integer and clamped to
//! `[0, 255]`.

use crate::image::{ImageView, OwnedImage};
use crate::util::{ScaleMatchError, ScaleMatchResult};

/// Source taps and weights for one destination sample.
type Taps = Vec<(usize, f32)>;

/// Resizes a grayscale view to `dst_width × dst_height`.
pub fn resize_u8(
    src: ImageView<'_, u8>,
    dst_width: usize,
    dst_height: usize,
) -> ScaleMatchResult<OwnedImage> {
    if dst_width == 0 || dst_height == 0 {
        return Err(ScaleMatchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }

    let src_width = src.width();
    let src_height = src.height();
    if src_width == dst_width && src_height == dst_height {
        return Ok(src.to_owned_image());
    }

    let x_taps = axis_taps(src_width, dst_width);
    let y_taps = axis_taps(src_height, dst_height);

    // Horizontal pass into a `src_height × dst_width` float buffer.
    let mut horiz = vec![0.0f32; src_height * dst_width];
    for y in 0..src_height {
        let row = src.row(y).expect("row within validated view");
        let out = &mut horiz[y * dst_width..(y + 1) * dst_width];
        for (dst, taps) in out.iter_mut().zip(x_taps.iter()) {
            *dst = taps.iter().map(|&(sx, w)| row[sx] as f32 * w).sum();
        }
    }

    let mut data = vec![0u8; dst_width * dst_height];
    for (dy, taps) in y_taps.iter().enumerate() {
        let out = &mut data[dy * dst_width..(dy + 1) * dst_width];
        for (dx, dst) in out.iter_mut().enumerate() {
            let value: f32 = taps
                .iter()
                .map(|&(sy, w)| horiz[sy * dst_width + dx] * w)
                .sum();
            *dst = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    OwnedImage::new(data, dst_width, dst_height)
}

fn axis_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    if dst_len == src_len {
        (0..dst_len).map(|i| vec![(i, 1.0)]).collect()
    } else if dst_len < src_len {
        area_taps(src_len, dst_len)
    } else {
        linear_taps(src_len, dst_len)
    }
}

/// Overlap weights of each destination cell `[d * r, (d + 1) * r)` with the
/// unit source cells, where `r = src_len / dst_len > 1`.
fn area_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    let ratio = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * ratio;
            let end = ((d + 1) as f64 * ratio).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            let mut taps = Vec::with_capacity(last - first);
            for s in first..last {
                let overlap = (end.min((s + 1) as f64) - start.max(s as f64)).max(0.0);
                if overlap > 1e-9 {
                    taps.push((s, (overlap / ratio) as f32));
                }
            }
            taps
        })
        .collect()
}

fn linear_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    let ratio = src_len as f64 / dst_len as f64;
    let max_idx = (src_len - 1) as f64;
    (0..dst_len)
        .map(|d| {
            let pos = ((d as f64 + 0.5) * ratio - 0.5).clamp(0.0, max_idx);
            let s0 = pos.floor() as usize;
            let s1 = (s0 + 1).min(src_len - 1);
            let frac = (pos - s0 as f64) as f32;
            if s1 == s0 || frac <= 0.0 {
                vec![(s0, 1.0)]
            } else {
                vec![(s0, 1.0 - frac), (s1, frac)]
            }
        })
        .collect()
}
