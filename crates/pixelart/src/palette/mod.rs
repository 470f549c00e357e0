//! Color palettes and nearest-color lookup.
//!
//! A [`ColorPalette`] is an ordered, non-empty list of target colors. Order
//! matters: when two palette entries are equally close to a pixel, the one
//! declared first wins, so palettes must never be reordered.
//!
//! The built-in retro palettes live in [`presets`].

pub mod presets;

use crate::error::{PipelineError, Result};
use crate::image::Color;

/// A named, ordered set of target colors.
///
/// # Example
///
/// ```
/// use pixelart::{Color, ColorPalette};
///
/// let palette = ColorPalette::new(
///     "bw",
///     "Black & White",
///     vec![Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)],
/// )
/// .unwrap();
///
/// assert_eq!(palette.nearest(Color::rgb(200, 190, 210)), Color::rgb(255, 255, 255));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    id: String,
    name: String,
    colors: Vec<Color>,
    max_colors: usize,
}

impl ColorPalette {
    /// Create a palette whose declared maximum equals its color count.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Palette`] if `colors` is empty or `id` is blank.
    pub fn new(id: impl Into<String>, name: impl Into<String>, colors: Vec<Color>) -> Result<Self> {
        let max_colors = colors.len();
        Self::with_max_colors(id, name, colors, max_colors)
    }

    /// Create a palette with an explicit declared maximum color count.
    ///
    /// The maximum is informational and not enforced.
    pub fn with_max_colors(
        id: impl Into<String>,
        name: impl Into<String>,
        colors: Vec<Color>,
        max_colors: usize,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PipelineError::Palette("palette id cannot be empty".into()));
        }
        if colors.is_empty() {
            return Err(PipelineError::Palette(format!(
                "palette '{id}' has no colors"
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            colors,
            max_colors,
        })
    }

    /// Create a palette from hex strings such as `"#0f380f"`.
    pub fn from_hex(id: impl Into<String>, name: impl Into<String>, hex: &[&str]) -> Result<Self> {
        let colors = hex
            .iter()
            .map(|h| Color::from_hex(h))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(id, name, colors)
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[inline]
    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false: palettes are non-empty by construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the entry closest to `rgb` by Euclidean RGB distance.
    ///
    /// Ties resolve to the lowest index.
    pub fn nearest_index(&self, rgb: [f32; 3]) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, color) in self.colors.iter().enumerate() {
            let dist = color.distance_sq(rgb);
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }

    /// Palette entry closest to `color` (alpha ignored in the comparison).
    #[inline]
    pub fn nearest(&self, color: Color) -> Color {
        self.colors[self.nearest_index([color.r as f32, color.g as f32, color.b as f32])]
    }

    /// True when some entry has exactly the same R, G, B.
    pub fn contains_rgb(&self, rgb: [u8; 3]) -> bool {
        self.colors
            .iter()
            .any(|c| c.r == rgb[0] && c.g == rgb[1] && c.b == rgb[2])
    }
}
