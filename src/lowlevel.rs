//! Low-level building blocks for custom matching pipelines.
//!
//! These expose the individual stages behind [`crate::Locator`]: the edge
//! operators, resampling, summed-area tables, template plans and kernels.
//! Most users should prefer the top-level `Locator`.

pub use crate::candidate::peak::{BestPeak, Peak};
pub use crate::edge::{canny, gaussian_blur_3x3};
pub use crate::image::integral::{IntegralImage, WindowSums};
pub use crate::image::resize::resize_u8;
pub use crate::kernel::scalar::{ZnccDenseScalar, ZnccSparseScalar};
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ZnccDenseSimd;
pub use crate::kernel::{Kernel, ScanParams};
pub use crate::search::footprint;
pub use crate::template::{SparseSample, TemplatePlan};
