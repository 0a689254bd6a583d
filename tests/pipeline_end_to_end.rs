use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scalematch::lowlevel::resize_u8;
use scalematch::{
    DebugSink, ImageView, LocateConfig, Locator, MatchBox, Outcome, ScaleMatchError,
    ScaleMatchResult,
};

/// 20×20 template: a 12×12 black square inside a 4-pixel white border.
fn bordered_square() -> Vec<u8> {
    let mut data = vec![255u8; 20 * 20];
    for y in 4..16 {
        for x in 4..16 {
            data[y * 20 + x] = 0;
        }
    }
    data
}

/// 200×200 white canvas with the template scaled by 0.8 pasted at (50, 60).
fn canvas_with_square(template: ImageView<'_, u8>) -> Vec<u8> {
    let pasted = resize_u8(template, 16, 16).unwrap();
    let mut data = vec![255u8; 200 * 200];
    for y in 0..16 {
        let dst = (60 + y) * 200 + 50;
        data[dst..dst + 16].copy_from_slice(pasted.view().row(y).unwrap());
    }
    data
}

#[derive(Default)]
struct RecordingSink {
    boxes: Vec<MatchBox>,
    fail: bool,
}

impl DebugSink for RecordingSink {
    fn write(&mut self, _target: ImageView<'_, u8>, bbox: MatchBox) -> ScaleMatchResult<()> {
        self.boxes.push(bbox);
        if self.fail {
            return Err(ScaleMatchError::DebugWrite {
                reason: "read-only directory".to_string(),
            });
        }
        Ok(())
    }
}

#[test]
fn scaled_square_is_found() {
    let tpl_data = bordered_square();
    let template = ImageView::from_slice(&tpl_data, 20, 20).unwrap();
    let scene = canvas_with_square(template);
    let target = ImageView::from_slice(&scene, 200, 200).unwrap();

    let outcome = Locator::new().locate(target, template).unwrap();
    let result = match outcome {
        Outcome::Found(result) => result,
        Outcome::NotFound(result) => panic!("expected a match, got {result:?}"),
    };

    assert!(result.found);
    assert!(result.best.score >= 0.70, "{result:?}");
    assert!((result.best.scale - 0.8).abs() <= 0.05 + 1e-6, "{result:?}");
    let bbox = result.match_box.unwrap();
    assert!(bbox.x.abs_diff(50) <= 2, "{bbox:?}");
    assert!(bbox.y.abs_diff(60) <= 2, "{bbox:?}");
    assert_eq!(bbox.w, result.best.width);
    assert_eq!(bbox.h, result.best.height);
}

#[test]
fn noise_template_on_flat_target_is_not_found() {
    let mut rng = StdRng::seed_from_u64(0x5ca1e);
    let tpl_data: Vec<u8> = (0..32 * 32).map(|_| rng.random::<u8>()).collect();
    let template = ImageView::from_slice(&tpl_data, 32, 32).unwrap();
    let scene = vec![128u8; 200 * 200];
    let target = ImageView::from_slice(&scene, 200, 200).unwrap();

    let outcome = Locator::new().locate(target, template).unwrap();
    assert!(!outcome.is_found());
    let result = outcome.into_result();
    assert!(!result.found);
    assert!(result.match_box.is_none());
    assert!(result.best.score < 0.70);
    assert_eq!(result.threshold, 0.70);
}

#[test]
fn lowering_the_threshold_flips_the_decision_without_changing_best() {
    let tpl_data = bordered_square();
    let template = ImageView::from_slice(&tpl_data, 20, 20).unwrap();
    let scene = canvas_with_square(template);
    let target = ImageView::from_slice(&scene, 200, 200).unwrap();

    let strict = Locator::new()
        .with_config(LocateConfig {
            threshold: 1.01,
            ..LocateConfig::default()
        })
        .locate(target, template)
        .unwrap();
    let lenient = Locator::new().locate(target, template).unwrap();

    assert!(!strict.is_found());
    assert!(lenient.is_found());
    assert_eq!(strict.result().best, lenient.result().best);
}

#[test]
fn sink_receives_the_match_box_only_on_success() {
    let tpl_data = bordered_square();
    let template = ImageView::from_slice(&tpl_data, 20, 20).unwrap();
    let scene = canvas_with_square(template);
    let target = ImageView::from_slice(&scene, 200, 200).unwrap();
    let locator = Locator::new();

    let mut sink = RecordingSink::default();
    let report = locator.locate_with_sink(target, template, &mut sink).unwrap();
    assert!(report.outcome.is_found());
    assert!(report.debug_error.is_none());
    assert_eq!(sink.boxes, vec![report.outcome.result().match_box.unwrap()]);

    let flat = vec![255u8; 200 * 200];
    let flat_target = ImageView::from_slice(&flat, 200, 200).unwrap();
    let mut sink = RecordingSink::default();
    let report = locator
        .locate_with_sink(flat_target, template, &mut sink)
        .unwrap();
    assert!(!report.outcome.is_found());
    assert!(sink.boxes.is_empty());
}

#[test]
fn failing_sink_does_not_change_the_outcome() {
    let tpl_data = bordered_square();
    let template = ImageView::from_slice(&tpl_data, 20, 20).unwrap();
    let scene = canvas_with_square(template);
    let target = ImageView::from_slice(&scene, 200, 200).unwrap();
    let locator = Locator::new();

    let expected = locator.locate(target, template).unwrap();
    let mut sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };
    let report = locator.locate_with_sink(target, template, &mut sink).unwrap();

    assert_eq!(report.outcome, expected);
    assert!(matches!(
        report.debug_error,
        Some(ScaleMatchError::DebugWrite { .. })
    ));
}

#[test]
fn template_too_large_for_target_is_an_error() {
    let tpl_data = bordered_square();
    let template = ImageView::from_slice(&tpl_data, 20, 20).unwrap();
    let scene = vec![255u8; 8 * 8];
    let target = ImageView::from_slice(&scene, 8, 8).unwrap();

    let err = Locator::new().locate(target, template).unwrap_err();
    assert!(matches!(err, ScaleMatchError::NoValidScale { .. }));
}

#[test]
fn invalid_configuration_is_rejected_before_matching() {
    let tpl_data = bordered_square();
    let template = ImageView::from_slice(&tpl_data, 20, 20).unwrap();
    let scene = canvas_with_square(template);
    let target = ImageView::from_slice(&scene, 200, 200).unwrap();

    let mut cfg = LocateConfig::default();
    cfg.search.scales.step = 0.0;
    let err = Locator::new()
        .with_config(cfg)
        .locate(target, template)
        .unwrap_err();
    assert!(matches!(err, ScaleMatchError::InvalidConfig { .. }));

    let cfg = LocateConfig {
        threshold: f32::NAN,
        ..LocateConfig::default()
    };
    let err = Locator::new()
        .with_config(cfg)
        .locate(target, template)
        .unwrap_err();
    assert!(matches!(err, ScaleMatchError::InvalidConfig { .. }));
}

#[cfg(feature = "image-io")]
#[test]
fn file_sink_writes_annotated_target() {
    use scalematch::io::{load_gray_image, ImageFileSink};

    let tpl_data = bordered_square();
    let template = ImageView::from_slice(&tpl_data, 20, 20).unwrap();
    let scene = canvas_with_square(template);
    let target = ImageView::from_slice(&scene, 200, 200).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.png");
    let mut sink = ImageFileSink::new(&path);
    let report = Locator::new()
        .locate_with_sink(target, template, &mut sink)
        .unwrap();

    assert!(report.outcome.is_found());
    assert!(report.debug_error.is_none());
    let written = load_gray_image(&path).unwrap();
    assert_eq!((written.width(), written.height()), (200, 200));
}
