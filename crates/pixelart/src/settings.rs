//! Per-run configuration shared by every processing step.

use crate::error::{PipelineError, Result};
use crate::image::Size;
use crate::palette::ColorPalette;

/// Settings consumed by every processing step.
///
/// Steps take `&PixelSettings` and never modify it. Construct with
/// [`PixelSettings::new`] and chain the builder methods:
///
/// ```
/// use pixelart::{PixelSettings, Registry};
///
/// let registry = Registry::with_presets();
/// let settings = PixelSettings::new(32, 32)
///     .palette(registry.palette("gameboy").unwrap().clone())
///     .dithering(true)
///     .dither_strength(0.5);
///
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSettings {
    /// Output size produced by the resize steps.
    pub target_size: Size,

    /// Integer magnification applied by consumers (assembler, export).
    ///
    /// Not used by the processing steps themselves.
    pub pixel_scale: u32,

    /// Palette for quantization; `None` turns quantization steps into no-ops.
    pub palette: Option<ColorPalette>,

    pub dithering: bool,

    /// Dither intensity in `[0, 1]`.
    pub dither_strength: f32,

    /// Contrast boost in `[0, 1]`.
    pub contrast_boost: f32,

    /// Additive brightness offset in `[-255, 255]`.
    pub brightness_adjust: i32,
}

impl PixelSettings {
    /// Settings for a target size with every optional stage disabled.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target_size: Size::new(width, height),
            pixel_scale: 1,
            palette: None,
            dithering: false,
            dither_strength: 0.5,
            contrast_boost: 0.0,
            brightness_adjust: 0,
        }
    }

    #[inline]
    pub fn palette(mut self, palette: ColorPalette) -> Self {
        self.palette = Some(palette);
        self
    }

    #[inline]
    pub fn pixel_scale(mut self, scale: u32) -> Self {
        self.pixel_scale = scale;
        self
    }

    #[inline]
    pub fn dithering(mut self, enabled: bool) -> Self {
        self.dithering = enabled;
        self
    }

    #[inline]
    pub fn dither_strength(mut self, strength: f32) -> Self {
        self.dither_strength = strength;
        self
    }

    #[inline]
    pub fn contrast_boost(mut self, boost: f32) -> Self {
        self.contrast_boost = boost;
        self
    }

    #[inline]
    pub fn brightness_adjust(mut self, offset: i32) -> Self {
        self.brightness_adjust = offset;
        self
    }

    /// True when an ordered or error-diffusion dither step should run.
    #[inline]
    pub fn wants_dither(&self) -> bool {
        self.palette.is_some() && self.dithering
    }

    /// True when a brightness/contrast step has something to do.
    #[inline]
    pub fn wants_adjustment(&self) -> bool {
        self.contrast_boost != 0.0 || self.brightness_adjust != 0
    }

    /// Check every field is in range.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidSettings`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.target_size.width == 0 || self.target_size.height == 0 {
            return Err(PipelineError::InvalidSettings(format!(
                "target size must be non-zero, got {}x{}",
                self.target_size.width, self.target_size.height
            )));
        }
        if self.pixel_scale == 0 {
            return Err(PipelineError::InvalidSettings(
                "pixel_scale must be at least 1".into(),
            ));
        }
        check_unit("dither_strength", self.dither_strength)?;
        check_unit("contrast_boost", self.contrast_boost)?;
        if !(-255..=255).contains(&self.brightness_adjust) {
            return Err(PipelineError::InvalidSettings(format!(
                "brightness_adjust must be within [-255, 255], got {}",
                self.brightness_adjust
            )));
        }
        Ok(())
    }
}

fn check_unit(field: &str, value: f32) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(PipelineError::InvalidSettings(format!(
            "{field} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Color;

    #[test]
    fn test_defaults_are_valid() {
        let settings = PixelSettings::new(16, 16);
        assert!(settings.validate().is_ok());
        assert!(!settings.wants_dither());
        assert!(!settings.wants_adjustment());
    }

    #[test]
    fn test_zero_target_rejected() {
        let err = PixelSettings::new(0, 16).validate().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSettings(msg) if msg.contains("0x16")));
    }

    #[test]
    fn test_out_of_range_fields_rejected() {
        assert!(PixelSettings::new(4, 4).dither_strength(1.5).validate().is_err());
        assert!(PixelSettings::new(4, 4).contrast_boost(-0.1).validate().is_err());
        assert!(PixelSettings::new(4, 4).contrast_boost(f32::NAN).validate().is_err());
        assert!(PixelSettings::new(4, 4).brightness_adjust(256).validate().is_err());
        assert!(PixelSettings::new(4, 4).pixel_scale(0).validate().is_err());
    }

    #[test]
    fn test_wants_dither_requires_palette() {
        let settings = PixelSettings::new(4, 4).dithering(true);
        assert!(!settings.wants_dither());

        let palette = ColorPalette::new("p", "P", vec![Color::rgb(0, 0, 0)]).unwrap();
        assert!(settings.palette(palette).wants_dither());
    }
}
