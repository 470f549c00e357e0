//! Image processing steps.
//!
//! Every step implements [`ProcessingStep`]: a pure function from an input
//! image plus settings to a newly allocated output image. Algorithms chain
//! steps, feeding each step the previous step's output.
//!
//! # Steps
//!
//! | Step | Purpose |
//! |------|---------|
//! | [`InputCleaning`] | 3×3 median on R, G, B |
//! | [`LocalContrast`] | 8×8 tiled partial histogram equalization |
//! | [`BilateralDenoise`] | Edge-preserving radius-2 bilateral filter |
//! | [`SmartResize`] | Area-average downscale / bicubic upscale |
//! | [`SmoothResize`] | tiny-skia resampler (nearest, bilinear, bicubic) |
//! | [`Quantize`] | Nearest palette color |
//! | [`OrderedDither`] | 4×4 Bayer threshold, then nearest palette color |
//! | [`ErrorDiffusion`] | Floyd–Steinberg error diffusion |
//! | [`IsolatedPixelRemoval`] | Replace pixels far from their neighbor mean |
//! | [`ArtifactRemoval`] | Replace pixels with fewer than 2 similar neighbors |
//! | [`EdgeSmoothing`] | Blur only where the Sobel magnitude is high |
//! | [`ContrastBrightness`] | Contrast curve, then brightness |
//! | [`SimpleAdjust`] | Brightness, then linear `1 + c` contrast |
//!
//! # Snapshot discipline
//!
//! Neighborhood steps read every neighbor from the unmodified input and
//! write into a separate output buffer. Results therefore never depend on
//! iteration order. [`ErrorDiffusion`] is the one exception: diffusing
//! error into not-yet-visited pixels is the algorithm.
//!
//! # Guarded steps
//!
//! Quantization, dithering and adjustment steps return a copy of their input
//! when their trigger in [`PixelSettings`] is off.

mod adjust;
mod cleanup;
mod contrast;
mod denoise;
mod quantize;
mod resize;

pub use adjust::{ContrastBrightness, SimpleAdjust};
pub use cleanup::{ArtifactRemoval, EdgeSmoothing, IsolatedPixelRemoval};
pub use contrast::LocalContrast;
pub use denoise::{BilateralDenoise, InputCleaning};
pub use quantize::{ErrorDiffusion, OrderedDither, Quantize, BAYER_4X4};
pub use resize::{ResampleQuality, SmartResize, SmoothResize};

use crate::error::Result;
use crate::image::RasterImage;
use crate::settings::PixelSettings;

/// A single image transform.
///
/// Implementations must be deterministic and must not modify `input`.
pub trait ProcessingStep: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Transform `input` into a new image.
    fn execute(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage>;
}

/// The 8 neighbor offsets, row by row.
pub(crate) const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Visit every interior pixel (one pixel away from each border).
///
/// Does nothing for images narrower or shorter than 3 pixels.
pub(crate) fn for_each_interior(image: &RasterImage, mut f: impl FnMut(usize, usize)) {
    let w = image.width() as usize;
    let h = image.height() as usize;
    if w < 3 || h < 3 {
        return;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            f(x, y);
        }
    }
}

/// Mean R, G, B of the 8 neighbors of an interior pixel.
pub(crate) fn neighbor_mean(image: &RasterImage, x: usize, y: usize) -> [f32; 3] {
    let data = image.data();
    let mut sum = [0.0f32; 3];
    for (dx, dy) in NEIGHBORS {
        let i = image.offset((x as isize + dx) as usize, (y as isize + dy) as usize);
        for c in 0..3 {
            sum[c] += data[i + c] as f32;
        }
    }
    sum.map(|s| s / 8.0)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::image::{Color, RasterImage};

    /// Image with a gradient and a few sharp features.
    pub fn busy_image(width: u32, height: u32) -> RasterImage {
        RasterImage::from_fn(width, height, |x, y| {
            let v = ((x * 255) / width.max(2).saturating_sub(1).max(1)) as u8;
            if (x + y) % 7 == 0 {
                Color::rgb(255 - v, v / 2, 40)
            } else {
                Color::rgb(v, (y * 13 % 256) as u8, 128)
            }
        })
        .unwrap()
    }

    pub fn solid(width: u32, height: u32, color: Color) -> RasterImage {
        RasterImage::filled(width, height, color).unwrap()
    }
}
