//! Lookup table for palettes, algorithms and layout engines.
//!
//! A [`Registry`] is built once at startup and passed to whoever needs to
//! resolve names from configuration. There is no global instance.

use crate::algorithm::{AlgorithmKind, PixelAlgorithm};
use crate::error::{PipelineError, Result};
use crate::layout::{Layout, LayoutDescriptor, LayoutKind};
use crate::palette::{presets, ColorPalette};

/// Name → component resolution.
///
/// ```
/// use pixelart::{AlgorithmKind, Registry};
///
/// let registry = Registry::with_presets();
/// assert_eq!(registry.palette("gameboy").unwrap().len(), 4);
/// assert_eq!(registry.algorithm("bilinear").unwrap().kind(), AlgorithmKind::Bilinear);
/// assert!(registry.palette("nope").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    palettes: Vec<ColorPalette>,
}

impl Registry {
    /// An empty registry. Algorithms and layouts are always available;
    /// palettes must be registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in preset palette.
    pub fn with_presets() -> Self {
        Self {
            palettes: presets::PRESETS.iter().map(|p| p.to_palette()).collect(),
        }
    }

    /// Add a palette.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Palette`] if a palette with the same id exists.
    pub fn register_palette(&mut self, palette: ColorPalette) -> Result<()> {
        if self.palettes.iter().any(|p| p.id() == palette.id()) {
            return Err(PipelineError::Palette(format!(
                "duplicate palette id: {}",
                palette.id()
            )));
        }
        tracing::debug!(id = palette.id(), colors = palette.len(), "registered palette");
        self.palettes.push(palette);
        Ok(())
    }

    pub fn palette(&self, id: &str) -> Result<&ColorPalette> {
        self.palettes
            .iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| PipelineError::UnknownPalette(id.to_string()))
    }

    /// Every palette, in registration order.
    pub fn palettes(&self) -> &[ColorPalette] {
        &self.palettes
    }

    pub fn algorithm(&self, name: &str) -> Result<PixelAlgorithm> {
        Ok(PixelAlgorithm::new(name.parse::<AlgorithmKind>()?))
    }

    pub fn algorithms(&self) -> &'static [AlgorithmKind] {
        &AlgorithmKind::ALL
    }

    pub fn layout_kind(&self, name: &str) -> Result<LayoutKind> {
        name.parse()
    }

    pub fn layout(&self, descriptor: &LayoutDescriptor) -> Layout {
        descriptor.build()
    }
}
