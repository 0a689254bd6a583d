//! High-level entry point running the full pipeline.

use crate::decision::{
    decide, report, validate_threshold, DebugSink, Outcome, Report, DEFAULT_THRESHOLD,
};
use crate::edge::{edge_map, EdgeConfig};
use crate::image::ImageView;
use crate::search::{scale_sweep, MatchConfig, ScaleSweep};
use crate::trace::trace_span;
use crate::util::ScaleMatchResult;

/// Configuration for all three pipeline stages.
#[derive(Clone, Debug, PartialEq)]
pub struct LocateConfig {
    /// Edge transform parameters, shared by target and template.
    pub edge: EdgeConfig,
    /// Scale sweep parameters.
    pub search: MatchConfig,
    /// Minimum score for a positive decision.
    pub threshold: f32,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            edge: EdgeConfig::default(),
            search: MatchConfig::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl LocateConfig {
    /// Validates every stage's parameters.
    pub fn validate(&self) -> ScaleMatchResult<()> {
        self.edge.validate()?;
        self.search.validate()?;
        validate_threshold(self.threshold)
    }
}

/// Scale-invariant template locator.
///
/// Each call is independent: inputs are converted to edge maps, the template
/// is swept over the configured scales, and the best candidate is compared
/// against the threshold.
#[derive(Clone, Debug, Default)]
pub struct Locator {
    cfg: LocateConfig,
}

impl Locator {
    /// Creates a locator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: LocateConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &LocateConfig {
        &self.cfg
    }

    /// Runs the edge transform and the scale sweep, returning every
    /// per-scale candidate.
    pub fn sweep(
        &self,
        target: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
    ) -> ScaleMatchResult<ScaleSweep> {
        self.cfg.validate()?;
        let _span = trace_span!("locate").entered();
        let target_edges = edge_map(target, &self.cfg.edge)?;
        let template_edges = edge_map(template, &self.cfg.edge)?;
        scale_sweep(target_edges.view(), template_edges.view(), &self.cfg.search)
    }

    /// Locates `template` inside `target`.
    pub fn locate(
        &self,
        target: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
    ) -> ScaleMatchResult<Outcome> {
        let sweep = self.sweep(target, template)?;
        Ok(Outcome::from_result(decide(sweep.best, self.cfg.threshold)))
    }

    /// Locates `template` and hands positive matches to `sink`.
    ///
    /// Sink failures are reported in [`Report::debug_error`] and leave the
    /// outcome untouched.
    pub fn locate_with_sink(
        &self,
        target: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
        sink: &mut dyn DebugSink,
    ) -> ScaleMatchResult<Report> {
        let outcome = self.locate(target, template)?;
        Ok(report(outcome, target, sink))
    }
}
