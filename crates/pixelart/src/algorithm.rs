//! Named pixel-art strategies built from processing steps.
//!
//! [`AlgorithmKind`] is a closed set of strategies; [`PixelAlgorithm`] pairs a
//! kind with its ordered step list. Each strategy is an explicit composition,
//! so near-duplicate steps (two cleanup thresholds, two adjustment orders)
//! stay separately testable instead of hiding behind flags.

use std::fmt;
use std::str::FromStr;

use crate::error::{PipelineError, Result};
use crate::image::RasterImage;
use crate::settings::PixelSettings;
use crate::steps::{
    ArtifactRemoval, BilateralDenoise, ContrastBrightness, EdgeSmoothing, ErrorDiffusion,
    InputCleaning, IsolatedPixelRemoval, LocalContrast, OrderedDither, ProcessingStep, Quantize,
    ResampleQuality, SimpleAdjust, SmartResize, SmoothResize,
};

/// Strategy selection.
///
/// # Pipelines
///
/// - **NearestNeighbor**: median clean → nearest resample → isolated pixel
///   removal → quantize → Floyd–Steinberg (when dithering) → contrast/brightness
/// - **Bilinear**: median clean → bilinear resample → artifact removal →
///   quantize → Bayer dither (when dithering) → simple adjust
/// - **Professional**: local contrast → bilateral denoise → area/bicubic
///   resize → quantize or Bayer dither → isolated pixel removal → edge
///   smoothing → contrast/brightness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlgorithmKind {
    NearestNeighbor,
    Bilinear,
    #[default]
    Professional,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 3] = [
        AlgorithmKind::NearestNeighbor,
        AlgorithmKind::Bilinear,
        AlgorithmKind::Professional,
    ];

    /// Identifier used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::NearestNeighbor => "nearest-neighbor",
            AlgorithmKind::Bilinear => "bilinear",
            AlgorithmKind::Professional => "professional",
        }
    }

    /// The ordered step list for this strategy.
    pub fn steps(self) -> Vec<Box<dyn ProcessingStep>> {
        match self {
            AlgorithmKind::NearestNeighbor => vec![
                Box::new(InputCleaning),
                Box::new(SmoothResize::new(ResampleQuality::Nearest)),
                Box::new(IsolatedPixelRemoval::default()),
                Box::new(Quantize::undithered()),
                Box::new(ErrorDiffusion),
                Box::new(ContrastBrightness),
            ],
            AlgorithmKind::Bilinear => vec![
                Box::new(InputCleaning),
                Box::new(SmoothResize::new(ResampleQuality::Bilinear)),
                Box::new(ArtifactRemoval::default()),
                Box::new(Quantize::undithered()),
                Box::new(OrderedDither),
                Box::new(SimpleAdjust),
            ],
            AlgorithmKind::Professional => vec![
                Box::new(LocalContrast::default()),
                Box::new(BilateralDenoise::default()),
                Box::new(SmartResize),
                Box::new(Quantize::undithered()),
                Box::new(OrderedDither),
                Box::new(IsolatedPixelRemoval::default()),
                Box::new(EdgeSmoothing::default()),
                Box::new(ContrastBrightness),
            ],
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = PipelineError;

    /// Accepts the configuration names plus a few common spellings.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest-neighbor" | "nearest_neighbor" | "nearest" => {
                Ok(AlgorithmKind::NearestNeighbor)
            }
            "bilinear" => Ok(AlgorithmKind::Bilinear),
            "professional" | "pro" => Ok(AlgorithmKind::Professional),
            _ => Err(PipelineError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// An algorithm: a kind and the steps it runs, in order.
///
/// # Example
///
/// ```
/// use pixelart::{AlgorithmKind, Color, PixelAlgorithm, PixelSettings, RasterImage};
///
/// let algorithm = PixelAlgorithm::new(AlgorithmKind::Professional);
/// let frame = RasterImage::filled(64, 64, Color::rgb(30, 120, 200)).unwrap();
/// let sprite = algorithm.apply(&frame, &PixelSettings::new(16, 16)).unwrap();
///
/// assert_eq!(sprite.width(), 16);
/// assert!(algorithm.supports_worker());
/// ```
pub struct PixelAlgorithm {
    kind: AlgorithmKind,
    steps: Vec<Box<dyn ProcessingStep>>,
}

impl PixelAlgorithm {
    pub fn new(kind: AlgorithmKind) -> Self {
        Self {
            kind,
            steps: kind.steps(),
        }
    }

    #[inline]
    pub fn kind(&self) -> AlgorithmKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order, each on the previous step's output.
    ///
    /// # Errors
    ///
    /// Fails before any step runs if `settings` are invalid; otherwise
    /// returns the first step error unchanged.
    pub fn apply(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage> {
        settings.validate()?;

        let mut current = input.clone();
        for step in &self.steps {
            let _span = tracing::trace_span!("step", name = step.name()).entered();
            current = step.execute(&current, settings)?;
        }
        Ok(current)
    }

    /// Whether the algorithm may run off the calling thread.
    ///
    /// Every strategy is a pure function of its inputs, so this is always
    /// true; steps are `Send + Sync` by trait bound.
    #[inline]
    pub fn supports_worker(&self) -> bool {
        true
    }
}

impl Clone for PixelAlgorithm {
    fn clone(&self) -> Self {
        Self::new(self.kind)
    }
}

impl fmt::Debug for PixelAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelAlgorithm")
            .field("kind", &self.kind)
            .field("steps", &self.step_names())
            .finish()
    }
}

impl From<AlgorithmKind> for PixelAlgorithm {
    fn from(kind: AlgorithmKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Color, Size};
    use crate::palette::presets;

    fn render() -> RasterImage {
        RasterImage::from_fn(48, 40, |x, y| {
            let r = (x * 5) as u8;
            let g = (y * 6) as u8;
            if (x / 8 + y / 8) % 2 == 0 {
                Color::rgb(r, g, 180)
            } else {
                Color::rgba(240 - r, g / 2, 30, 200)
            }
        })
        .unwrap()
    }

    #[test]
    fn test_parse_names() {
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.name().parse::<AlgorithmKind>().unwrap(), kind);
        }
        assert_eq!("Nearest".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::NearestNeighbor);
    }

    #[test]
    fn test_unknown_name_is_error() {
        let err = "lanczos".parse::<AlgorithmKind>().unwrap_err();
        assert_eq!(err, PipelineError::UnknownAlgorithm("lanczos".into()));
    }

    #[test]
    fn test_step_order_professional() {
        let algo = PixelAlgorithm::new(AlgorithmKind::Professional);
        assert_eq!(
            algo.step_names(),
            vec![
                "local-contrast",
                "bilateral-denoise",
                "smart-resize",
                "quantize",
                "ordered-dither",
                "isolated-pixel-removal",
                "edge-smoothing",
                "contrast-brightness",
            ]
        );
    }

    #[test]
    fn test_every_kind_produces_target_size() {
        let settings = PixelSettings::new(12, 10);
        for kind in AlgorithmKind::ALL {
            let out = PixelAlgorithm::new(kind).apply(&render(), &settings).unwrap();
            assert_eq!(out.size(), Size::new(12, 10), "{kind}");
        }
    }

    #[test]
    fn test_every_kind_is_deterministic() {
        let palette = presets::find("pico8").unwrap().to_palette();
        let settings = PixelSettings::new(16, 16)
            .palette(palette)
            .dithering(true)
            .contrast_boost(0.2)
            .brightness_adjust(-5);
        for kind in AlgorithmKind::ALL {
            let algo = PixelAlgorithm::new(kind);
            let a = algo.apply(&render(), &settings).unwrap();
            let b = algo.apply(&render(), &settings).unwrap();
            assert_eq!(a, b, "{kind}");
        }
    }

    #[test]
    fn test_invalid_settings_fail_fast() {
        let settings = PixelSettings::new(0, 8);
        for kind in AlgorithmKind::ALL {
            let err = PixelAlgorithm::new(kind).apply(&render(), &settings).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidSettings(_)));
        }
    }

    #[test]
    fn test_nearest_neighbor_palette_closure() {
        // No post-quantization smoothing in this pipeline and no adjustment
        let palette = presets::find("gameboy").unwrap().to_palette();
        let settings = PixelSettings::new(16, 16).palette(palette.clone());
        let out = PixelAlgorithm::new(AlgorithmKind::NearestNeighbor)
            .apply(&render(), &settings)
            .unwrap();
        assert!(out.pixels().all(|p| palette.contains_rgb([p[0], p[1], p[2]])));
    }

    #[test]
    fn test_clone_keeps_kind() {
        let algo = PixelAlgorithm::new(AlgorithmKind::Bilinear);
        assert_eq!(algo.clone().kind(), AlgorithmKind::Bilinear);
        assert!(format!("{algo:?}").contains("simple-adjust"));
    }
}
