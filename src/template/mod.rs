//! Template precomputation for correlation kernels.

mod plan;

pub use plan::{SparseSample, TemplatePlan};
