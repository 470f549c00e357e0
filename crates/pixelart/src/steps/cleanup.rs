//! Post-resize cleanup: stray pixel removal and edge-aware smoothing.
//!
//! All three steps read neighbors from the untouched input and write to a
//! separate output, so a replaced pixel never influences its neighbors within
//! the same pass.

use super::{for_each_interior, neighbor_mean, ProcessingStep, NEIGHBORS};
use crate::error::Result;
use crate::image::{clamp_channel, RasterImage};
use crate::settings::PixelSettings;

/// Replace pixels that differ sharply from the mean of their 8 neighbors.
///
/// A pixel is replaced by the neighbor mean when
/// `Σ |rgb - mean|` exceeds `threshold` (150 by default).
#[derive(Debug, Clone, Copy)]
pub struct IsolatedPixelRemoval {
    pub threshold: f32,
}

impl Default for IsolatedPixelRemoval {
    fn default() -> Self {
        Self { threshold: 150.0 }
    }
}

impl ProcessingStep for IsolatedPixelRemoval {
    fn name(&self) -> &'static str {
        "isolated-pixel-removal"
    }

    fn execute(&self, input: &RasterImage, _settings: &PixelSettings) -> Result<RasterImage> {
        let mut output = input.clone();
        let src = input.data();

        for_each_interior(input, |x, y| {
            let i = input.offset(x, y);
            let mean = neighbor_mean(input, x, y);
            let diff: f32 = (0..3).map(|c| (src[i + c] as f32 - mean[c]).abs()).sum();
            if diff > self.threshold {
                let out = output.data_mut();
                for c in 0..3 {
                    out[i + c] = clamp_channel(mean[c]);
                }
            }
        });
        Ok(output)
    }
}

/// Replace pixels that have too few similar neighbors.
///
/// A neighbor is similar when `Σ |Δrgb| <= similarity` (30 by default).
/// Pixels with fewer than `min_similar` (2) similar neighbors become the
/// neighbor mean.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactRemoval {
    pub similarity: u32,
    pub min_similar: usize,
}

impl Default for ArtifactRemoval {
    fn default() -> Self {
        Self {
            similarity: 30,
            min_similar: 2,
        }
    }
}

impl ProcessingStep for ArtifactRemoval {
    fn name(&self) -> &'static str {
        "artifact-removal"
    }

    fn execute(&self, input: &RasterImage, _settings: &PixelSettings) -> Result<RasterImage> {
        let mut output = input.clone();
        let src = input.data();

        for_each_interior(input, |x, y| {
            let i = input.offset(x, y);
            let similar = NEIGHBORS
                .iter()
                .filter(|(dx, dy)| {
                    let n = input.offset((x as isize + dx) as usize, (y as isize + dy) as usize);
                    let diff: u32 = (0..3).map(|c| src[i + c].abs_diff(src[n + c]) as u32).sum();
                    diff <= self.similarity
                })
                .count();

            if similar < self.min_similar {
                let mean = neighbor_mean(input, x, y);
                let out = output.data_mut();
                for c in 0..3 {
                    out[i + c] = clamp_channel(mean[c]);
                }
            }
        });
        Ok(output)
    }
}

/// Blur only where a Sobel edge is detected.
///
/// The gradient magnitude is measured on luma. Where it exceeds `threshold`
/// (50), the pixel is replaced with a 3×3 weighted blur:
///
/// ```text
/// 0.05 0.10 0.05
/// 0.10 0.40 0.10
/// 0.05 0.10 0.05
/// ```
///
/// Flat regions are left untouched.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSmoothing {
    pub threshold: f32,
}

impl Default for EdgeSmoothing {
    fn default() -> Self {
        Self { threshold: 50.0 }
    }
}

const BLUR_WEIGHTS: [[f32; 3]; 3] = [[0.05, 0.1, 0.05], [0.1, 0.4, 0.1], [0.05, 0.1, 0.05]];
const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

#[inline]
fn luma(px: &[u8]) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

impl EdgeSmoothing {
    fn gradient_magnitude(input: &RasterImage, x: usize, y: usize) -> f32 {
        let src = input.data();
        let mut gx = 0.0;
        let mut gy = 0.0;
        for (ky, row) in SOBEL_X.iter().enumerate() {
            for (kx, &wx) in row.iter().enumerate() {
                let i = input.offset(x + kx - 1, y + ky - 1);
                let l = luma(&src[i..i + 3]);
                gx += wx * l;
                gy += SOBEL_Y[ky][kx] * l;
            }
        }
        (gx * gx + gy * gy).sqrt()
    }
}

impl ProcessingStep for EdgeSmoothing {
    fn name(&self) -> &'static str {
        "edge-smoothing"
    }

    fn execute(&self, input: &RasterImage, _settings: &PixelSettings) -> Result<RasterImage> {
        let mut output = input.clone();
        let src = input.data();

        for_each_interior(input, |x, y| {
            if Self::gradient_magnitude(input, x, y) <= self.threshold {
                return;
            }
            let mut sum = [0.0f32; 3];
            for (ky, row) in BLUR_WEIGHTS.iter().enumerate() {
                for (kx, &weight) in row.iter().enumerate() {
                    let n = input.offset(x + kx - 1, y + ky - 1);
                    for c in 0..3 {
                        sum[c] += src[n + c] as f32 * weight;
                    }
                }
            }
            let i = input.offset(x, y);
            let out = output.data_mut();
            for c in 0..3 {
                out[i + c] = clamp_channel(sum[c]);
            }
        });
        Ok(output)
    }
}
