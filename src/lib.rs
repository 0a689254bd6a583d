//! ScaleMatch is a CPU template locator that is invariant to unknown scale.
//!
//! Both images are reduced to Canny edge maps, the template edge map is
//! resized over a range of scale factors, and each size is correlated against
//! the target with ZNCC. The best (scale, position) pair is thresholded into
//! a found / not-found decision. Optional features add a rayon-parallel scale
//! sweep (`rayon`), a vectorized dense kernel (`simd`), file loading and
//! debug rendering (`image-io`), and spans and events (`tracing`).

mod candidate;
pub mod decision;
pub mod edge;
pub mod image;
pub mod kernel;
pub mod locator;
pub mod lowlevel;
pub mod search;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use candidate::peak::Peak;
pub use decision::{decide, DebugSink, MatchBox, MatchResult, Outcome, Report, DEFAULT_THRESHOLD};
pub use edge::{edge_map, EdgeConfig};
pub use crate::image::{ImageView, OwnedImage};
pub use locator::{LocateConfig, Locator};
pub use search::{
    best_match, scale_sweep, KernelChoice, MatchCandidate, MatchConfig, ScaleRange, ScaleSweep,
    MAX_SCALES,
};
pub use util::{ScaleMatchError, ScaleMatchResult};
