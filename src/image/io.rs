//! Convenience helpers for loading and writing images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Color and alpha channels
//! are discarded on load; matching only ever sees luminance.
//!
//! Luminance uses the BT.601 weights `0.299 R + 0.587 G + 0.114 B` in 14-bit
//! fixed point with round-half-up, the same integer conversion OpenCV applies
//! for `COLOR_BGR2GRAY`. `image`'s own `to_luma8` uses BT.709 weights and
//! would give different edge maps on colour inputs.

use crate::decision::{DebugSink, MatchBox};
use crate::image::{ImageView, OwnedImage};
use crate::util::{ScaleMatchError, ScaleMatchResult};
use ::image::{
    EncodableLayout, ImageBuffer, ImageFormat, ImageReader, Pixel, PixelWithColorType, Rgb,
    RgbImage,
};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

/// Outline color of the debug rectangle.
const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Outline thickness of the debug rectangle in pixels.
const BOX_THICKNESS: u32 = 2;

/// BT.601 luma weights scaled by `1 << LUMA_SHIFT`; they sum to exactly `1 << LUMA_SHIFT`.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Converts one RGB sample to BT.601 luminance.
fn bt601_luma(Rgb([r, g, b]): Rgb<u8>) -> u8 {
    let weighted = LUMA_R * u32::from(r) + LUMA_G * u32::from(g) + LUMA_B * u32::from(b);
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Creates an owned grayscale image from a dynamic image.
///
/// Single-channel 8-bit images are copied unchanged; everything else is
/// reduced to 8-bit RGB first and then weighted with the BT.601 luma weights.
pub fn owned_from_dynamic_image(img: &::image::DynamicImage) -> ScaleMatchResult<OwnedImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = match img {
        ::image::DynamicImage::ImageLuma8(gray) => gray.as_raw().clone(),
        other => other.to_rgb8().pixels().map(|&px| bt601_luma(px)).collect(),
    };
    OwnedImage::new(data, width, height).map_err(|_| ScaleMatchError::InvalidImage {
        reason: format!("decoded image has zero area ({width}x{height})"),
    })
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> ScaleMatchResult<OwnedImage> {
    let path = path.as_ref();
    let invalid = |err: &dyn std::fmt::Display| ScaleMatchError::InvalidImage {
        reason: format!("{}: {err}", path.display()),
    };
    let img = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| invalid(&err))?
        .decode()
        .map_err(|err| invalid(&err))?;
    owned_from_dynamic_image(&img).map_err(|err| match err {
        ScaleMatchError::InvalidImage { reason } => ScaleMatchError::InvalidImage {
            reason: format!("{}: {reason}", path.display()),
        },
        other => other,
    })
}

/// Writes a grayscale view to disk, choosing the format from the extension.
pub fn save_gray_image<P: AsRef<Path>>(view: ImageView<'_, u8>, path: P) -> ScaleMatchResult<()> {
    let owned = view.to_owned_image();
    let (width, height) = (owned.width() as u32, owned.height() as u32);
    let gray = ::image::GrayImage::from_raw(width, height, owned.into_vec()).ok_or(
        ScaleMatchError::InvalidDimensions {
            width: width as usize,
            height: height as usize,
        },
    )?;
    save_with_default_format(&gray, path.as_ref()).map_err(|err| ScaleMatchError::InvalidImage {
        reason: format!("{}: {err}", path.as_ref().display()),
    })
}

/// Draws the match box on a color copy of the target.
pub fn annotate(target: ImageView<'_, u8>, bbox: MatchBox) -> RgbImage {
    let width = target.width() as u32;
    let height = target.height() as u32;
    let mut canvas = RgbImage::from_fn(width, height, |x, y| {
        let v = target.get(x as usize, y as usize).copied().unwrap_or(0);
        Rgb([v, v, v])
    });

    // The outline spans (x, y) to (x + w, y + h) inclusive and grows outward.
    for i in 0..BOX_THICKNESS {
        let rect = Rect::at(bbox.x as i32 - i as i32, bbox.y as i32 - i as i32).of_size(
            bbox.w as u32 + 1 + 2 * i,
            bbox.h as u32 + 1 + 2 * i,
        );
        draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
    }
    canvas
}

/// Debug sink that writes the annotated target to a file.
#[derive(Clone, Debug)]
pub struct ImageFileSink {
    path: PathBuf,
}

impl ImageFileSink {
    /// Creates a sink writing to `path`; PNG is used when it has no extension.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Returns the output path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DebugSink for ImageFileSink {
    fn write(&mut self, target: ImageView<'_, u8>, bbox: MatchBox) -> ScaleMatchResult<()> {
        let canvas = annotate(target, bbox);
        save_with_default_format(&canvas, &self.path).map_err(|err| ScaleMatchError::DebugWrite {
            reason: format!("{}: {err}", self.path.display()),
        })
    }
}

fn save_with_default_format<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    path: &Path,
) -> ::image::ImageResult<()>
where
    P: Pixel + PixelWithColorType,
    [P::Subpixel]: EncodableLayout,
{
    if path.extension().is_some() {
        img.save(path)
    } else {
        img.save_with_format(path, ImageFormat::Png)
    }
}
