//! Thresholded decision and optional debug reporting.
//!
//! The decision is a pure function of the best candidate and the threshold.
//! Visual verification goes through an injected [`DebugSink`] that is only
//! called for positive results and cannot change them.

use crate::search::MatchCandidate;
use crate::trace::trace_warn;
use crate::util::{ScaleMatchError, ScaleMatchResult};
use crate::ImageView;

/// Default decision threshold on the ZNCC score.
pub const DEFAULT_THRESHOLD: f32 = 0.70;

/// Axis-aligned box of a positive match in target coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchBox {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl From<&MatchCandidate> for MatchBox {
    fn from(c: &MatchCandidate) -> Self {
        Self {
            x: c.x,
            y: c.y,
            w: c.width,
            h: c.height,
        }
    }
}

/// Final, always fully populated decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    /// `best.score >= threshold`.
    pub found: bool,
    /// Best candidate over all scales, reported even when not found.
    pub best: MatchCandidate,
    /// Threshold the decision was made against.
    pub threshold: f32,
    /// Present exactly when `found` is true.
    pub match_box: Option<MatchBox>,
}

/// Applies the threshold to the best candidate.
pub fn decide(best: MatchCandidate, threshold: f32) -> MatchResult {
    let found = best.score >= threshold;
    MatchResult {
        found,
        best,
        threshold,
        match_box: found.then(|| MatchBox::from(&best)),
    }
}

/// Checks that a threshold can be compared against scores.
pub fn validate_threshold(threshold: f32) -> ScaleMatchResult<()> {
    if threshold.is_finite() {
        Ok(())
    } else {
        Err(ScaleMatchError::InvalidConfig {
            reason: "threshold must be finite",
        })
    }
}

/// Distinguishes a positive from a negative decision.
///
/// Both variants carry the full result for diagnostics and threshold tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Found(MatchResult),
    NotFound(MatchResult),
}

impl Outcome {
    /// Wraps a result according to its `found` flag.
    pub fn from_result(result: MatchResult) -> Self {
        if result.found {
            Self::Found(result)
        } else {
            Self::NotFound(result)
        }
    }

    /// Returns true for [`Outcome::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the carried result.
    pub fn result(&self) -> &MatchResult {
        match self {
            Self::Found(result) | Self::NotFound(result) => result,
        }
    }

    /// Consumes the outcome and returns the carried result.
    pub fn into_result(self) -> MatchResult {
        match self {
            Self::Found(result) | Self::NotFound(result) => result,
        }
    }
}

/// Output capability for annotated debug images.
pub trait DebugSink {
    /// Persists a visualization of `bbox` drawn over `target`.
    fn write(&mut self, target: ImageView<'_, u8>, bbox: MatchBox) -> ScaleMatchResult<()>;
}

/// Outcome plus the status of the debug sink.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub outcome: Outcome,
    /// Set when the sink was called and failed.
    pub debug_error: Option<ScaleMatchError>,
}

/// Calls `sink` for positive outcomes; sink failures never alter `outcome`.
pub fn report(outcome: Outcome, target: ImageView<'_, u8>, sink: &mut dyn DebugSink) -> Report {
    let debug_error = match outcome.result().match_box {
        Some(bbox) if outcome.is_found() => sink.write(target, bbox).err().map(|err| {
            let reason = err.to_string();
            trace_warn!("debug_write_failed", reason = reason.as_str());
            match err {
                ScaleMatchError::DebugWrite { .. } => err,
                other => ScaleMatchError::DebugWrite {
                    reason: other.to_string(),
                },
            }
        }),
        _ => None,
    };
    Report {
        outcome,
        debug_error,
    }
}
