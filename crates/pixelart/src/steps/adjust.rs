//! Final brightness/contrast adjustment.
//!
//! Two variants exist side by side and produce different results for the
//! same settings:
//!
//! - [`ContrastBrightness`]: contrast curve first, brightness second.
//! - [`SimpleAdjust`]: brightness first, then a linear `1 + c` stretch.
//!
//! Both skip entirely when `contrast_boost == 0` and `brightness_adjust == 0`.

use super::ProcessingStep;
use crate::error::Result;
use crate::image::{clamp_channel, RasterImage};
use crate::settings::PixelSettings;

/// Upper bound for the scaled contrast so `259 - c` never reaches zero.
const MAX_CONTRAST: f32 = 254.0;

/// Apply `f` to R, G, B of every pixel, leaving alpha alone.
fn map_rgb(input: &RasterImage, f: impl Fn(f32) -> f32) -> RasterImage {
    let mut output = input.clone();
    for px in output.data_mut().chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = clamp_channel(f(*c as f32));
        }
    }
    output
}

/// Contrast via `f = 259(c + 255) / (255(259 - c))`, then brightness.
///
/// `contrast_boost ∈ [0, 1]` is scaled onto the formula's `c ∈ [0, 254]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContrastBrightness;

impl ContrastBrightness {
    /// Contrast factor for a `contrast_boost` in `[0, 1]`.
    pub fn factor(contrast_boost: f32) -> f32 {
        let c = (contrast_boost * 255.0).clamp(0.0, MAX_CONTRAST);
        (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
    }
}

impl ProcessingStep for ContrastBrightness {
    fn name(&self) -> &'static str {
        "contrast-brightness"
    }

    fn execute(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage> {
        if !settings.wants_adjustment() {
            return Ok(input.clone());
        }
        let factor = Self::factor(settings.contrast_boost);
        let brightness = settings.brightness_adjust as f32;
        Ok(map_rgb(input, |v| factor * (v - 128.0) + 128.0 + brightness))
    }
}

/// Brightness first, then `(v - 128) · (1 + contrast_boost) + 128`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAdjust;

impl ProcessingStep for SimpleAdjust {
    fn name(&self) -> &'static str {
        "simple-adjust"
    }

    fn execute(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage> {
        if !settings.wants_adjustment() {
            return Ok(input.clone());
        }
        let factor = 1.0 + settings.contrast_boost;
        let brightness = settings.brightness_adjust as f32;
        Ok(map_rgb(input, |v| (v + brightness - 128.0) * factor + 128.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Color;
    use crate::steps::test_support::busy_image;

    #[test]
    fn test_zero_adjustment_is_identity() {
        let img = busy_image(5, 4);
        let settings = PixelSettings::new(5, 4);
        assert_eq!(ContrastBrightness.execute(&img, &settings).unwrap(), img);
        assert_eq!(SimpleAdjust.execute(&img, &settings).unwrap(), img);
    }

    #[test]
    fn test_factor_at_zero_is_one() {
        assert!((ContrastBrightness::factor(0.0) - 1.0).abs() < 1e-6);
        assert!(ContrastBrightness::factor(1.0).is_finite());
        assert!(ContrastBrightness::factor(0.5) > 1.0);
    }

    #[test]
    fn test_brightness_only() {
        let img = RasterImage::filled(2, 2, Color::rgba(100, 250, 5, 42)).unwrap();
        let settings = PixelSettings::new(2, 2).brightness_adjust(10);
        let out = ContrastBrightness.execute(&img, &settings).unwrap();
        assert_eq!(out.pixel(0, 0), [110, 255, 15, 42]);

        let settings = PixelSettings::new(2, 2).brightness_adjust(-10);
        let out = SimpleAdjust.execute(&img, &settings).unwrap();
        assert_eq!(out.pixel(0, 0), [90, 240, 0, 42]);
    }

    #[test]
    fn test_contrast_spreads_around_midpoint() {
        let img = RasterImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Color::rgb(100, 100, 100)
            } else {
                Color::rgb(156, 156, 156)
            }
        })
        .unwrap();
        let settings = PixelSettings::new(2, 1).contrast_boost(0.5);

        for step in [&ContrastBrightness as &dyn ProcessingStep, &SimpleAdjust] {
            let out = step.execute(&img, &settings).unwrap();
            assert!(out.pixel(0, 0)[0] < 100, "{}", step.name());
            assert!(out.pixel(1, 0)[0] > 156, "{}", step.name());
        }
    }

    #[test]
    fn test_variants_differ_in_ordering() {
        // SimpleAdjust stretches the brightness offset too; ContrastBrightness
        // adds it after the curve.
        let img = RasterImage::filled(1, 1, Color::rgb(128, 128, 128)).unwrap();
        let settings = PixelSettings::new(1, 1)
            .contrast_boost(1.0)
            .brightness_adjust(20);

        let a = ContrastBrightness.execute(&img, &settings).unwrap();
        let b = SimpleAdjust.execute(&img, &settings).unwrap();
        assert_eq!(a.pixel(0, 0)[0], 148);
        assert_eq!(b.pixel(0, 0)[0], 168);
    }
}
