//! Summed-area tables for constant-time window statistics.
//!
//! Sums are kept as exact `u64` values so window means and variances do not
//! drift with image size.

use crate::image::ImageView;

/// Summed-area tables of sample values and squared sample values.
///
/// Both tables have `(width + 1) * (height + 1)` entries with a zero first
/// row and column, so the sum over `[x, x + w) × [y, y + h)` needs four reads.
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

/// Sum and sum of squares over one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSums {
    /// Sum of sample values.
    pub sum: u64,
    /// Sum of squared sample values.
    pub sum_sq: u64,
}

impl IntegralImage {
    /// Builds both tables from a grayscale view.
    pub fn from_view(image: ImageView<'_, u8>) -> Self {
        let width = image.width();
        let height = image.height();
        let stride = width + 1;
        let mut sum = vec![0u64; stride * (height + 1)];
        let mut sum_sq = vec![0u64; stride * (height + 1)];

        for y in 0..height {
            let row = image.row(y).expect("row within validated view");
            let mut acc = 0u64;
            let mut acc_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                acc += v;
                acc_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + acc;
                sum_sq[idx] = sum_sq[idx - stride] + acc_sq;
            }
        }

        Self {
            width,
            height,
            sum,
            sum_sq,
        }
    }

    /// Returns the source width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the source height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the sums over the window with top-left `(x, y)` and size `w × h`.
    ///
    /// The window must lie inside the source image.
    #[inline]
    pub fn window(&self, x: usize, y: usize, w: usize, h: usize) -> WindowSums {
        debug_assert!(x + w <= self.width && y + h <= self.height);
        let stride = self.width + 1;
        let a = y * stride + x;
        let b = a + w;
        let c = (y + h) * stride + x;
        let d = c + w;
        WindowSums {
            sum: self.sum[d] + self.sum[a] - self.sum[b] - self.sum[c],
            sum_sq: self.sum_sq[d] + self.sum_sq[a] - self.sum_sq[b] - self.sum_sq[c],
        }
    }
}
