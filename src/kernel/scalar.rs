//! Scalar reference kernels for the cross term.

use crate::kernel::Kernel;
use crate::template::TemplatePlan;
use crate::ImageView;

/// Dense scalar kernel: multiplies every template sample.
pub struct ZnccDenseScalar;

/// Sparse scalar kernel: visits only the nonzero template samples.
///
/// For edge maps this skips the large zero background of the template.
pub struct ZnccSparseScalar;

impl Kernel for ZnccDenseScalar {
    #[inline]
    fn cross_at(image: ImageView<'_, u8>, tpl: &TemplatePlan, x: usize, y: usize) -> u64 {
        let tpl_width = tpl.width();
        let samples = tpl.samples();
        let mut cross = 0u64;
        for ty in 0..tpl.height() {
            let img_row = image.row(y + ty).expect("row within bounds for scan");
            let tpl_row = &samples[ty * tpl_width..(ty + 1) * tpl_width];
            let row_sum: u64 = tpl_row
                .iter()
                .zip(&img_row[x..x + tpl_width])
                .map(|(&t, &i)| u64::from(u32::from(t) * u32::from(i)))
                .sum();
            cross += row_sum;
        }
        cross
    }
}

impl Kernel for ZnccSparseScalar {
    #[inline]
    fn cross_at(image: ImageView<'_, u8>, tpl: &TemplatePlan, x: usize, y: usize) -> u64 {
        let data = image.as_slice();
        let stride = image.stride();
        let mut cross = 0u64;
        for sample in tpl.support() {
            let idx = (y + sample.y as usize) * stride + x + sample.x as usize;
            cross += u64::from(u32::from(sample.value) * u32::from(data[idx]));
        }
        cross
    }
}
