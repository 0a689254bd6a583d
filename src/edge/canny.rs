//! Canny edge detection on 8-bit grayscale images.
//!
//! Gradients come from 3×3 Sobel operators with replicated borders and the
//! magnitude is the L1 norm `|gx| + |gy|`. Non-maximum suppression compares
//! each pixel against its two neighbours along the gradient direction,
//! quantized to 0°, 45°, 90° or 135°; neighbours outside the image count as
//! zero. Hysteresis keeps every pixel above `high` plus every pixel above
//! `low` that is 8-connected to one of them.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::replicate;
use crate::util::ScaleMatchResult;

/// Output value of an edge pixel.
pub const EDGE: u8 = 255;

/// tan(22.5°) and tan(67.5°), the direction bin boundaries.
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    None,
    Weak,
    Strong,
}

/// Runs Canny with the given hysteresis thresholds on gradient magnitude.
pub fn canny(src: ImageView<'_, u8>, low: f32, high: f32) -> ScaleMatchResult<OwnedImage> {
    let width = src.width();
    let height = src.height();
    let (gx, gy) = sobel(src);

    let mag: Vec<f32> = gx
        .iter()
        .zip(gy.iter())
        .map(|(&dx, &dy)| (dx.abs() + dy.abs()) as f32)
        .collect();
    let mag_at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0.0
        } else {
            mag[y as usize * width + x as usize]
        }
    };

    let mut marks = vec![Mark::None; width * height];
    let mut stack = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let m = mag[idx];
            if m <= low {
                continue;
            }
            let (xi, yi) = (x as isize, y as isize);
            let ax = gx[idx].abs() as f32;
            let ay = gy[idx].abs() as f32;
            let is_max = if ay < ax * TAN_22_5 {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ay > ax * TAN_67_5 {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else {
                let s: isize = if (gx[idx] < 0) != (gy[idx] < 0) { -1 } else { 1 };
                m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
            };
            if !is_max {
                continue;
            }
            if m > high {
                marks[idx] = Mark::Strong;
                stack.push(idx);
            } else {
                marks[idx] = Mark::Weak;
            }
        }
    }

    while let Some(idx) = stack.pop() {
        let x = (idx % width) as isize;
        let y = (idx / width) as isize;
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let nidx = ny as usize * width + nx as usize;
                if marks[nidx] == Mark::Weak {
                    marks[nidx] = Mark::Strong;
                    stack.push(nidx);
                }
            }
        }
    }

    let out = marks
        .iter()
        .map(|&mark| if mark == Mark::Strong { EDGE } else { 0 })
        .collect();
    OwnedImage::new(out, width, height)
}

/// Horizontal and vertical 3×3 Sobel responses with replicated borders.
fn sobel(src: ImageView<'_, u8>) -> (Vec<i32>, Vec<i32>) {
    let width = src.width();
    let height = src.height();
    let mut gx = vec![0i32; width * height];
    let mut gy = vec![0i32; width * height];
    let px = |x: isize, y: isize| -> i32 {
        let sx = replicate(x, width);
        let sy = replicate(y, height);
        i32::from(*src.get(sx, sy).expect("clamped coordinates are in bounds"))
    };

    for y in 0..height as isize {
        for x in 0..width as isize {
            let tl = px(x - 1, y - 1);
            let tc = px(x, y - 1);
            let tr = px(x + 1, y - 1);
            let ml = px(x - 1, y);
            let mr = px(x + 1, y);
            let bl = px(x - 1, y + 1);
            let bc = px(x, y + 1);
            let br = px(x + 1, y + 1);
            let idx = y as usize * width + x as usize;
            gx[idx] = (tr + 2 * mr + br) - (tl + 2 * ml + bl);
            gy[idx] = (bl + 2 * bc + br) - (tl + 2 * tc + tr);
        }
    }
    (gx, gy)
}
