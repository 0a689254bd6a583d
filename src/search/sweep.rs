//! Scale sweep over the template edge map.

use crate::candidate::peak::Peak;
use crate::image::integral::IntegralImage;
use crate::image::resize::resize_u8;
use crate::kernel::scalar::ZnccSparseScalar;
use crate::kernel::{Kernel, ScanParams};
use crate::search::{
    footprint, KernelChoice, MatchCandidate, MatchConfig, ScaleSweep, AUTO_SPARSE_DENSITY,
};
use crate::template::TemplatePlan;
use crate::trace::{trace_event, trace_span};
use crate::util::{ScaleMatchError, ScaleMatchResult};
use crate::ImageView;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::time::Instant;

// Dense kernel alias - use SIMD when available
#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::ZnccDenseScalar as ZnccDense;
#[cfg(feature = "simd")]
use crate::kernel::simd::ZnccDenseSimd as ZnccDense;

/// Outcome of a single scale.
enum ScaleStep {
    /// The resized footprint does not fit strictly inside the target.
    Skipped,
    /// The time budget elapsed before this scale started.
    OverBudget,
    Matched(MatchCandidate),
}

/// Shared read-only inputs of every scale evaluation.
struct SweepContext<'a> {
    target: ImageView<'a, u8>,
    sums: IntegralImage,
    template: ImageView<'a, u8>,
    cfg: &'a MatchConfig,
    started: Instant,
    /// Index of the first scale whose footprint fits; never subject to the
    /// time budget.
    first_fit: Option<usize>,
}

/// Runs the full scale sweep and returns every per-scale candidate.
///
/// Both inputs are expected to be edge maps. Scales are evaluated in
/// ascending order (or in parallel and then reduced in ascending order), so
/// the result does not depend on scheduling.
pub fn scale_sweep(
    target: ImageView<'_, u8>,
    template: ImageView<'_, u8>,
    cfg: &MatchConfig,
) -> ScaleMatchResult<ScaleSweep> {
    cfg.validate()?;
    let scales = cfg.scales.scales();
    let _span = trace_span!(
        "scale_sweep",
        scales = scales.len(),
        target_width = target.width(),
        target_height = target.height()
    )
    .entered();

    let first_fit = scales.iter().position(|&scale| {
        let (tw, th) = footprint(
            template.width(),
            template.height(),
            scale,
            cfg.min_template_size,
        );
        fits_strictly(tw, th, target)
    });
    let ctx = SweepContext {
        target,
        sums: IntegralImage::from_view(target),
        template,
        cfg,
        started: Instant::now(),
        first_fit,
    };

    let steps = evaluate_all(&ctx, &scales)?;
    let sweep = reduce(steps).ok_or(ScaleMatchError::NoValidScale {
        template_width: template.width(),
        template_height: template.height(),
        target_width: target.width(),
        target_height: target.height(),
    })?;

    trace_event!(
        "sweep_best",
        score = sweep.best.score,
        scale = sweep.best.scale,
        x = sweep.best.x,
        y = sweep.best.y,
        evaluated = sweep.per_scale.len(),
        skipped = sweep.skipped,
        truncated = sweep.truncated
    );
    Ok(sweep)
}

/// Returns only the globally best candidate of [`scale_sweep`].
pub fn best_match(
    target: ImageView<'_, u8>,
    template: ImageView<'_, u8>,
    cfg: &MatchConfig,
) -> ScaleMatchResult<MatchCandidate> {
    scale_sweep(target, template, cfg).map(|sweep| sweep.best)
}

#[cfg(feature = "rayon")]
fn evaluate_all(ctx: &SweepContext<'_>, scales: &[f64]) -> ScaleMatchResult<Vec<ScaleStep>> {
    if ctx.cfg.parallel {
        return scales
            .par_iter()
            .enumerate()
            .map(|(idx, &scale)| evaluate_scale(ctx, idx, scale))
            .collect();
    }
    evaluate_sequential(ctx, scales)
}

#[cfg(not(feature = "rayon"))]
fn evaluate_all(ctx: &SweepContext<'_>, scales: &[f64]) -> ScaleMatchResult<Vec<ScaleStep>> {
    evaluate_sequential(ctx, scales)
}

/// Visits every scale so skips are still counted after the budget runs out;
/// over-budget scales return before any resize or scan.
fn evaluate_sequential(
    ctx: &SweepContext<'_>,
    scales: &[f64],
) -> ScaleMatchResult<Vec<ScaleStep>> {
    scales
        .iter()
        .enumerate()
        .map(|(idx, &scale)| evaluate_scale(ctx, idx, scale))
        .collect()
}

fn evaluate_scale(ctx: &SweepContext<'_>, idx: usize, scale: f64) -> ScaleMatchResult<ScaleStep> {
    let (tw, th) = footprint(
        ctx.template.width(),
        ctx.template.height(),
        scale,
        ctx.cfg.min_template_size,
    );
    if !fits_strictly(tw, th, ctx.target) {
        return Ok(ScaleStep::Skipped);
    }
    if let Some(budget) = ctx.cfg.time_budget {
        if ctx.first_fit != Some(idx) && ctx.started.elapsed() >= budget {
            return Ok(ScaleStep::OverBudget);
        }
    }

    let resized = resize_u8(ctx.template, tw, th)?;
    let plan = TemplatePlan::from_view(resized.view());
    let params = ScanParams {
        min_var_i: ctx.cfg.min_var_i,
    };
    let peak = scan_plan(ctx, &plan, params)?;

    trace_event!(
        "scale_candidate",
        scale = scale,
        width = tw,
        height = th,
        score = peak.score
    );
    Ok(ScaleStep::Matched(MatchCandidate {
        score: peak.score,
        scale,
        width: tw,
        height: th,
        x: peak.x,
        y: peak.y,
    }))
}

fn scan_plan(
    ctx: &SweepContext<'_>,
    plan: &TemplatePlan,
    params: ScanParams,
) -> ScaleMatchResult<Peak> {
    let sparse = match ctx.cfg.kernel {
        KernelChoice::Auto => plan.density() < AUTO_SPARSE_DENSITY,
        KernelChoice::Dense => false,
        KernelChoice::Sparse => true,
    };
    if sparse {
        ZnccSparseScalar::scan_best(ctx.target, &ctx.sums, plan, params)
    } else {
        ZnccDense::scan_best(ctx.target, &ctx.sums, plan, params)
    }
}

/// Folds per-scale steps in ascending scale order.
///
/// The running best is replaced only by a strictly higher score, so the
/// lowest scale wins exact ties.
fn reduce(steps: Vec<ScaleStep>) -> Option<ScaleSweep> {
    let mut best: Option<MatchCandidate> = None;
    let mut per_scale = Vec::with_capacity(steps.len());
    let mut skipped = 0usize;
    let mut truncated = false;

    for step in steps {
        match step {
            ScaleStep::Skipped => skipped += 1,
            ScaleStep::OverBudget => truncated = true,
            ScaleStep::Matched(candidate) => {
                match best {
                    Some(current) if candidate.score <= current.score => {}
                    _ => best = Some(candidate),
                }
                per_scale.push(candidate);
            }
        }
    }

    best.map(|best| ScaleSweep {
        best,
        per_scale,
        skipped,
        truncated,
    })
}

fn fits_strictly(width: usize, height: usize, target: ImageView<'_, u8>) -> bool {
    width < target.width() && height < target.height()
}

#[cfg(test)]
mod tests {
    use super::{reduce, ScaleStep};
    use crate::search::MatchCandidate;

    fn candidate(scale: f64, score: f32) -> MatchCandidate {
        MatchCandidate {
            score,
            scale,
            width: 4,
            height: 4,
            x: 0,
            y: 0,
        }
    }

    #[test]
    fn reduce_keeps_lowest_scale_on_ties() {
        let sweep = reduce(vec![
            ScaleStep::Skipped,
            ScaleStep::Matched(candidate(0.5, 0.8)),
            ScaleStep::Matched(candidate(0.6, 0.9)),
            ScaleStep::Matched(candidate(0.7, 0.9)),
            ScaleStep::Skipped,
        ])
        .unwrap();
        assert_eq!(sweep.best.scale, 0.6);
        assert_eq!(sweep.per_scale.len(), 3);
        assert_eq!(sweep.skipped, 2);
        assert!(!sweep.truncated);
    }

    #[test]
    fn reduce_without_matches_is_none() {
        assert!(reduce(vec![ScaleStep::Skipped, ScaleStep::Skipped]).is_none());
    }

    #[test]
    fn reduce_flags_budget_truncation() {
        let sweep = reduce(vec![
            ScaleStep::Matched(candidate(0.5, 0.1)),
            ScaleStep::OverBudget,
            ScaleStep::OverBudget,
        ])
        .unwrap();
        assert!(sweep.truncated);
        assert_eq!(sweep.per_scale.len(), 1);
    }
}
