//! Palette quantization: direct, ordered (Bayer) and error diffusion.

use super::ProcessingStep;
use crate::error::Result;
use crate::image::RasterImage;
use crate::palette::ColorPalette;
use crate::settings::PixelSettings;

/// 4×4 Bayer threshold matrix, values `0..16`.
pub const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Write palette entry `index` into `out` at byte offset `i`.
///
/// Alpha comes from the palette entry, not from the source pixel.
#[inline]
fn write_entry(out: &mut [u8], i: usize, palette: &ColorPalette, index: usize) {
    out[i..i + 4].copy_from_slice(&palette.colors()[index].to_array());
}

/// Replace every pixel with its nearest palette color.
///
/// No palette means no work: the input is returned unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantize {
    /// Also skip when dithering is requested, leaving that to a dither step.
    pub skip_when_dithering: bool,
}

impl Quantize {
    /// Quantize whenever a palette is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantize only when a palette is set and dithering is off.
    pub fn undithered() -> Self {
        Self {
            skip_when_dithering: true,
        }
    }
}

impl ProcessingStep for Quantize {
    fn name(&self) -> &'static str {
        "quantize"
    }

    fn execute(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage> {
        let Some(palette) = settings.palette.as_ref() else {
            return Ok(input.clone());
        };
        if self.skip_when_dithering && settings.dithering {
            return Ok(input.clone());
        }

        let mut output = input.clone();
        let out = output.data_mut();
        for (i, px) in input.data().chunks_exact(4).enumerate() {
            let index = palette.nearest_index([px[0] as f32, px[1] as f32, px[2] as f32]);
            write_entry(out, i * 4, palette, index);
        }
        Ok(output)
    }
}

/// Ordered dithering with the 4×4 Bayer matrix.
///
/// For pixel `(x, y)` the offset
///
/// ```text
/// t = (bayer[y % 4][x % 4] / 16 - 0.5) · (strength · 64 / 16)
/// ```
///
/// is added to R, G and B (clamped to `0..=255`) before the nearest palette
/// lookup. Runs only when a palette is set and dithering is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderedDither;

impl ProcessingStep for OrderedDither {
    fn name(&self) -> &'static str {
        "ordered-dither"
    }

    fn execute(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage> {
        let Some(palette) = settings.palette.as_ref().filter(|_| settings.dithering) else {
            return Ok(input.clone());
        };

        let spread = settings.dither_strength * 64.0 / 16.0;
        let w = input.width() as usize;
        let mut output = input.clone();
        let out = output.data_mut();

        for (i, px) in input.data().chunks_exact(4).enumerate() {
            let (x, y) = (i % w, i / w);
            let t = (BAYER_4X4[y % 4][x % 4] as f32 / 16.0 - 0.5) * spread;
            let rgb = [
                (px[0] as f32 + t).clamp(0.0, 255.0),
                (px[1] as f32 + t).clamp(0.0, 255.0),
                (px[2] as f32 + t).clamp(0.0, 255.0),
            ];
            write_entry(out, i * 4, palette, palette.nearest_index(rgb));
        }
        Ok(output)
    }
}

/// Floyd–Steinberg error diffusion.
///
/// Pixels are visited in raster order. Each pixel is snapped to its nearest
/// palette color, and `(original - chosen) · strength` is spread to the
/// unvisited neighbors:
///
/// ```text
///        X   7
///    3   5   1      (/16)
/// ```
///
/// Error accumulates in the output buffer itself: every addition is clamped
/// to `0..=255` and rounded back to a byte. A pixel is finalized before any of its error moves on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorDiffusion;

/// Floyd–Steinberg taps as `(dx, dy, weight)`.
const FLOYD_STEINBERG: [(isize, usize, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

impl ProcessingStep for ErrorDiffusion {
    fn name(&self) -> &'static str {
        "error-diffusion"
    }

    fn execute(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage> {
        let Some(palette) = settings.palette.as_ref().filter(|_| settings.dithering) else {
            return Ok(input.clone());
        };

        let w = input.width() as usize;
        let h = input.height() as usize;
        let strength = settings.dither_strength;

        let mut output = input.clone();
        let out = output.data_mut();

        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) * 4;
                let current = [out[i] as f32, out[i + 1] as f32, out[i + 2] as f32];
                let index = palette.nearest_index(current);
                let chosen = palette.colors()[index].to_array();
                write_entry(out, i, palette, index);

                let error = [
                    (current[0] - chosen[0] as f32) * strength,
                    (current[1] - chosen[1] as f32) * strength,
                    (current[2] - chosen[2] as f32) * strength,
                ];

                for (dx, dy, weight) in FLOYD_STEINBERG {
                    let nx = x as isize + dx;
                    let ny = y + dy;
                    if nx < 0 || nx as usize >= w || ny >= h {
                        continue;
                    }
                    let j = (ny * w + nx as usize) * 4;
                    for c in 0..3 {
                        let v = out[j + c] as f32 + error[c] * weight;
                        out[j + c] = v.clamp(0.0, 255.0).round() as u8;
                    }
                }
            }
        }
        Ok(output)
    }
}
