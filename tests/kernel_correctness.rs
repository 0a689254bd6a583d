use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scalematch::lowlevel::{
    IntegralImage, Kernel, ScanParams, TemplatePlan, ZnccDenseScalar, ZnccSparseScalar,
};
use scalematch::ImageView;

fn random_edges(rng: &mut StdRng, len: usize, density: f64) -> Vec<u8> {
    (0..len)
        .map(|_| if rng.random_bool(density) { 255 } else { 0 })
        .collect()
}

fn brute_zncc(
    image: &[u8],
    width: usize,
    tpl: &[u8],
    tw: usize,
    th: usize,
    x: usize,
    y: usize,
) -> f64 {
    let n = (tw * th) as f64;
    let mut st = 0.0;
    let mut si = 0.0;
    for ty in 0..th {
        for tx in 0..tw {
            st += tpl[ty * tw + tx] as f64;
            si += image[(y + ty) * width + x + tx] as f64;
        }
    }
    let (mt, mi) = (st / n, si / n);
    let (mut num, mut dt, mut di) = (0.0, 0.0, 0.0);
    for ty in 0..th {
        for tx in 0..tw {
            let t = tpl[ty * tw + tx] as f64 - mt;
            let i = image[(y + ty) * width + x + tx] as f64 - mi;
            num += t * i;
            dt += t * t;
            di += i * i;
        }
    }
    if dt == 0.0 || di <= 1e-8 {
        0.0
    } else {
        num / (dt * di).sqrt()
    }
}

#[test]
fn kernels_agree_with_brute_force_on_random_edge_maps() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..6 {
        let width = rng.random_range(20..48);
        let height = rng.random_range(16..40);
        let tw = rng.random_range(3..12);
        let th = rng.random_range(3..10);
        let image = random_edges(&mut rng, width * height, 0.2);
        let tpl = random_edges(&mut rng, tw * th, 0.3);

        let view = ImageView::from_slice(&image, width, height).unwrap();
        let sums = IntegralImage::from_view(view);
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, tw, th).unwrap());
        let params = ScanParams::default();

        for y in 0..=height - th {
            for x in 0..=width - tw {
                let dense = ZnccDenseScalar::score_at(view, &sums, &plan, x, y, params);
                let sparse = ZnccSparseScalar::score_at(view, &sums, &plan, x, y, params);
                let expected = brute_zncc(&image, width, &tpl, tw, th, x, y);
                assert_eq!(dense, sparse, "({x}, {y})");
                assert!(
                    (dense as f64 - expected).abs() < 1e-4,
                    "({x}, {y}): {dense} vs {expected}"
                );
            }
        }
    }
}

#[test]
fn scan_best_returns_first_maximum() {
    let mut rng = StdRng::seed_from_u64(11);
    let (width, height) = (40, 30);
    let (tw, th) = (6, 5);
    let image = random_edges(&mut rng, width * height, 0.25);
    let view = ImageView::from_slice(&image, width, height).unwrap();
    let sums = IntegralImage::from_view(view);

    // Template cut from the image itself scores exactly one at its origin.
    let tpl_view = view.roi(17, 11, tw, th).unwrap();
    let plan = TemplatePlan::from_view(tpl_view);
    let params = ScanParams::default();

    let dense = ZnccDenseScalar::scan_best(view, &sums, &plan, params).unwrap();
    let sparse = ZnccSparseScalar::scan_best(view, &sums, &plan, params).unwrap();
    assert_eq!(dense, sparse);
    assert!((dense.score - 1.0).abs() < 1e-6);

    let mut first = None;
    for y in 0..=height - th {
        for x in 0..=width - tw {
            let score = ZnccDenseScalar::score_at(view, &sums, &plan, x, y, params);
            if score == dense.score && first.is_none() {
                first = Some((x, y));
            }
        }
    }
    assert_eq!(first, Some((dense.x, dense.y)));
}

#[cfg(feature = "simd")]
#[test]
fn simd_kernel_matches_scalar() {
    use scalematch::lowlevel::ZnccDenseSimd;

    let mut rng = StdRng::seed_from_u64(23);
    let (width, height) = (70, 40);
    let (tw, th) = (19, 11);
    let image = random_edges(&mut rng, width * height, 0.3);
    let tpl = random_edges(&mut rng, tw * th, 0.3);
    let view = ImageView::from_slice(&image, width, height).unwrap();
    let sums = IntegralImage::from_view(view);
    let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, tw, th).unwrap());
    let params = ScanParams::default();

    let scalar = ZnccDenseScalar::scan_best(view, &sums, &plan, params).unwrap();
    let simd = ZnccDenseSimd::scan_best(view, &sums, &plan, params).unwrap();
    assert_eq!(scalar, simd);
}
