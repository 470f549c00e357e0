//! Noise reduction: median input cleaning and bilateral denoise.

use super::ProcessingStep;
use crate::error::Result;
use crate::image::{clamp_channel, RasterImage};
use crate::settings::PixelSettings;

/// 3×3 per-channel median filter over R, G, B.
///
/// Border rows and columns are copied unchanged and alpha is never touched.
/// Removes salt-and-pepper noise left by the renderer's anti-aliasing before
/// downscaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputCleaning;

impl ProcessingStep for InputCleaning {
    fn name(&self) -> &'static str {
        "input-cleaning"
    }

    fn execute(&self, input: &RasterImage, _settings: &PixelSettings) -> Result<RasterImage> {
        let mut output = input.clone();
        let src = input.data();
        let w = input.width() as usize;
        let h = input.height() as usize;
        if w < 3 || h < 3 {
            return Ok(output);
        }

        let mut window = [0u8; 9];
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let out = input.offset(x, y);
                for c in 0..3 {
                    let mut k = 0;
                    for ny in y - 1..=y + 1 {
                        for nx in x - 1..=x + 1 {
                            window[k] = src[input.offset(nx, ny) + c];
                            k += 1;
                        }
                    }
                    window.sort_unstable();
                    output.data_mut()[out + c] = window[4];
                }
            }
        }
        Ok(output)
    }
}

/// Edge-preserving bilateral filter.
///
/// Each pixel becomes the weighted mean of its radius-2 neighborhood, with
/// weight `spatial(dx, dy) · range(|Δrgb|)`. Neighbors with very different
/// colors get near-zero weight, so edges survive while flat regions are
/// smoothed. Neighbors outside the image are skipped.
#[derive(Debug, Clone, Copy)]
pub struct BilateralDenoise {
    pub radius: usize,
    pub sigma_spatial: f32,
    pub sigma_range: f32,
}

impl Default for BilateralDenoise {
    fn default() -> Self {
        Self {
            radius: 2,
            sigma_spatial: 2.0,
            sigma_range: 50.0,
        }
    }
}

impl BilateralDenoise {
    fn spatial_kernel(&self) -> Vec<f32> {
        let r = self.radius as isize;
        let side = 2 * self.radius + 1;
        let denom = 2.0 * self.sigma_spatial * self.sigma_spatial;
        let mut kernel = Vec::with_capacity(side * side);
        for dy in -r..=r {
            for dx in -r..=r {
                kernel.push((-((dx * dx + dy * dy) as f32) / denom).exp());
            }
        }
        kernel
    }
}

impl ProcessingStep for BilateralDenoise {
    fn name(&self) -> &'static str {
        "bilateral-denoise"
    }

    fn execute(&self, input: &RasterImage, _settings: &PixelSettings) -> Result<RasterImage> {
        let mut output = input.clone();
        let src = input.data();
        let w = input.width() as isize;
        let h = input.height() as isize;
        let r = self.radius as isize;
        let side = 2 * r + 1;
        let spatial = self.spatial_kernel();
        let range_denom = 2.0 * self.sigma_range * self.sigma_range;

        for y in 0..h {
            for x in 0..w {
                let center = input.offset(x as usize, y as usize);
                let c_rgb = [
                    src[center] as f32,
                    src[center + 1] as f32,
                    src[center + 2] as f32,
                ];

                let mut sum = [0.0f32; 3];
                let mut weight_sum = 0.0f32;

                for dy in -r..=r {
                    let ny = y + dy;
                    if ny < 0 || ny >= h {
                        continue;
                    }
                    for dx in -r..=r {
                        let nx = x + dx;
                        if nx < 0 || nx >= w {
                            continue;
                        }
                        let n = input.offset(nx as usize, ny as usize);
                        let n_rgb = [src[n] as f32, src[n + 1] as f32, src[n + 2] as f32];
                        let dist_sq = (n_rgb[0] - c_rgb[0]).powi(2)
                            + (n_rgb[1] - c_rgb[1]).powi(2)
                            + (n_rgb[2] - c_rgb[2]).powi(2);

                        let weight = spatial[((dy + r) * side + (dx + r)) as usize]
                            * (-dist_sq / range_denom).exp();
                        for c in 0..3 {
                            sum[c] += n_rgb[c] * weight;
                        }
                        weight_sum += weight;
                    }
                }

                if weight_sum > 0.0 {
                    let out = output.data_mut();
                    for c in 0..3 {
                        out[center + c] = clamp_channel(sum[c] / weight_sum);
                    }
                }
            }
        }
        Ok(output)
    }
}
