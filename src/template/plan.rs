//! Template plan precomputation for ZNCC.

use crate::image::ImageView;

/// One nonzero template sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SparseSample {
    /// Column within the template.
    pub x: u32,
    /// Row within the template.
    pub y: u32,
    /// Sample value.
    pub value: u8,
}

/// Precomputed statistics and sample layouts for one resized template.
///
/// The cross term `Σ t·i` is exact in integers for `u8` data, so both the
/// dense row-major buffer and the sparse list of nonzero samples produce the
/// same score. Edge maps are mostly zero, which makes the sparse list short.
pub struct TemplatePlan {
    width: usize,
    height: usize,
    sum: u64,
    /// `n·Σt² - (Σt)²`, i.e. `n` times the sum of squared deviations.
    var_num: u128,
    samples: Vec<u8>,
    support: Vec<SparseSample>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> Self {
        let width = tpl.width();
        let height = tpl.height();
        let count = width * height;

        let mut samples = Vec::with_capacity(count);
        let mut support = Vec::new();
        let mut sum = 0u64;
        let mut sum_sq = 0u64;
        for y in 0..height {
            let row = tpl.row(y).expect("row within validated view");
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                sum += v;
                sum_sq += v * v;
                if value != 0 {
                    support.push(SparseSample {
                        x: x as u32,
                        y: y as u32,
                        value,
                    });
                }
            }
            samples.extend_from_slice(row);
        }

        let n = count as u128;
        let var_num = n * u128::from(sum_sq) - u128::from(sum) * u128::from(sum);

        Self {
            width,
            height,
            sum,
            var_num,
            samples,
            support,
        }
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false; plans are built from non-empty views.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the sum of all samples.
    pub fn sum(&self) -> u64 {
        self.sum
    }

    /// Returns `n·Σt² - (Σt)²` exactly.
    pub fn var_num(&self) -> u128 {
        self.var_num
    }

    /// Returns true when every sample has the same value.
    pub fn is_flat(&self) -> bool {
        self.var_num == 0
    }

    /// Returns the samples in row-major order.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Returns the nonzero samples in row-major order.
    pub fn support(&self) -> &[SparseSample] {
        &self.support
    }

    /// Returns the fraction of nonzero samples.
    pub fn density(&self) -> f32 {
        self.support.len() as f32 / self.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::TemplatePlan;
    use crate::ImageView;

    #[test]
    fn plan_matches_known_stats() {
        let data = [0u8, 255, 0, 255];
        let plan = TemplatePlan::from_view(ImageView::from_slice(&data, 2, 2).unwrap());
        assert_eq!(plan.sum(), 510);
        // n·Σt² - (Σt)² = 4·2·255² - 510²
        assert_eq!(plan.var_num(), 260_100);
        assert_eq!(plan.support().len(), 2);
        assert!((plan.density() - 0.5).abs() < 1e-6);
        assert!(!plan.is_flat());
    }

    #[test]
    fn flat_template_is_detected() {
        let data = [9u8; 6];
        let plan = TemplatePlan::from_view(ImageView::from_slice(&data, 3, 2).unwrap());
        assert!(plan.is_flat());
        assert_eq!(plan.support().len(), 6);
    }
}
