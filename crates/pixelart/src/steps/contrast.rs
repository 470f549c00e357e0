//! Local (tiled) contrast enhancement.

use super::ProcessingStep;
use crate::error::Result;
use crate::image::{clamp_channel, RasterImage};
use crate::settings::PixelSettings;

/// Partial histogram equalization over fixed square tiles.
///
/// For each `block_size × block_size` tile (edge tiles may be smaller) a
/// 256-bin luma histogram and its cumulative distribution are built. Every
/// channel value `v` in the tile is then remapped to
///
/// ```text
/// round(0.3 · v + 0.7 · cdf[v] / count · 255)
/// ```
///
/// Blending with the original keeps tile boundaries from turning blocky.
#[derive(Debug, Clone, Copy)]
pub struct LocalContrast {
    pub block_size: usize,
    /// Weight of the original value in the blend.
    pub original_weight: f32,
}

impl Default for LocalContrast {
    fn default() -> Self {
        Self {
            block_size: 8,
            original_weight: 0.3,
        }
    }
}

/// Rec. 601 luma, rounded into a histogram bin.
#[inline]
pub(crate) fn luma_bin(r: u8, g: u8, b: u8) -> usize {
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    (luma.round() as usize).min(255)
}

impl ProcessingStep for LocalContrast {
    fn name(&self) -> &'static str {
        "local-contrast"
    }

    fn execute(&self, input: &RasterImage, _settings: &PixelSettings) -> Result<RasterImage> {
        let mut output = input.clone();
        let src = input.data();
        let w = input.width() as usize;
        let h = input.height() as usize;
        let block = self.block_size.max(1);
        let equalized_weight = 1.0 - self.original_weight;

        for by in (0..h).step_by(block) {
            for bx in (0..w).step_by(block) {
                let y_end = (by + block).min(h);
                let x_end = (bx + block).min(w);
                let count = ((y_end - by) * (x_end - bx)) as f32;

                let mut hist = [0u32; 256];
                for y in by..y_end {
                    for x in bx..x_end {
                        let i = input.offset(x, y);
                        hist[luma_bin(src[i], src[i + 1], src[i + 2])] += 1;
                    }
                }

                let mut cdf = [0u32; 256];
                let mut running = 0;
                for (bin, &n) in hist.iter().enumerate() {
                    running += n;
                    cdf[bin] = running;
                }

                let out = output.data_mut();
                for y in by..y_end {
                    for x in bx..x_end {
                        let i = input.offset(x, y);
                        for c in 0..3 {
                            let v = src[i + c];
                            let equalized = cdf[v as usize] as f32 / count * 255.0;
                            out[i + c] = clamp_channel(
                                self.original_weight * v as f32 + equalized_weight * equalized,
                            );
                        }
                    }
                }
            }
        }
        Ok(output)
    }
}
