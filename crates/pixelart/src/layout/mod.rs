//! Sprite sheet layout engines.
//!
//! A layout turns a list of frame rectangles into positions on a sheet.
//! Three engines share the [`LayoutEngine`] trait:
//!
//! | Engine | Placement |
//! |--------|-----------|
//! | [`GridLayout`] | uniform cells, row-major |
//! | [`LinearLayout`] | a single horizontal or vertical strip |
//! | [`PackedLayout`] | free-rectangle bin packing, best short side fit |
//!
//! [`Layout`] is the closed enum over the three, used wherever the engine is
//! chosen at runtime (configuration, registry).

mod grid;
mod linear;
mod packed;

use std::fmt;
use std::str::FromStr;

pub use grid::GridLayout;
pub use linear::{Direction, LinearLayout};
pub use packed::{PackedLayout, SortOrder};

use crate::error::{PipelineError, Result};
use crate::image::Size;
use crate::processor::ProcessedFrame;

/// Where one frame lands on the sheet. Origin is the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePosition {
    pub frame_id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FramePosition {
    /// Whether two placements share any pixel.
    pub fn overlaps(&self, other: &FramePosition) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

/// Output of a layout calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResult {
    /// Placed frames, in input order.
    pub positions: Vec<FramePosition>,
    /// Sheet size including padding.
    pub total_size: Size,
    /// Frames the packer could not place. Always empty for grid and linear.
    pub skipped: Vec<String>,
}

/// Frame identity and extent, the only thing a layout needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRect {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl FrameRect {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

impl From<&ProcessedFrame> for FrameRect {
    fn from(frame: &ProcessedFrame) -> Self {
        let img = frame.processed();
        Self::new(frame.id(), img.width(), img.height())
    }
}

/// Common interface of the layout engines.
pub trait LayoutEngine {
    /// Compute placements for `frames`.
    ///
    /// `max_size` bounds the sheet where the engine can honor it: the grid
    /// narrows its column count, the packer caps its bin. Linear layouts
    /// ignore it.
    fn calculate(&self, frames: &[FrameRect], max_size: Option<Size>) -> Result<LayoutResult>;

    /// Sheet size for `frames` without a size limit.
    fn total_size(&self, frames: &[FrameRect]) -> Result<Size> {
        Ok(self.calculate(frames, None)?.total_size)
    }

    /// Whether the unconstrained layout fits within `max_size`.
    fn can_fit(&self, frames: &[FrameRect], max_size: Size) -> bool {
        self.total_size(frames)
            .map(|size| size.fits_within(max_size))
            .unwrap_or(false)
    }
}

pub(crate) fn ensure_frames(frames: &[FrameRect]) -> Result<()> {
    if frames.is_empty() {
        return Err(PipelineError::EmptyFrames);
    }
    if let Some(f) = frames.iter().find(|f| f.width == 0 || f.height == 0) {
        return Err(PipelineError::InvalidDimensions {
            width: f.width,
            height: f.height,
        });
    }
    Ok(())
}

/// Layout engine selected at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Grid(GridLayout),
    Linear(LinearLayout),
    Packed(PackedLayout),
}

impl Layout {
    pub fn kind(&self) -> LayoutKind {
        match self {
            Layout::Grid(_) => LayoutKind::Grid,
            Layout::Linear(_) => LayoutKind::Linear,
            Layout::Packed(_) => LayoutKind::Packed,
        }
    }
}

impl LayoutEngine for Layout {
    fn calculate(&self, frames: &[FrameRect], max_size: Option<Size>) -> Result<LayoutResult> {
        match self {
            Layout::Grid(l) => l.calculate(frames, max_size),
            Layout::Linear(l) => l.calculate(frames, max_size),
            Layout::Packed(l) => l.calculate(frames, max_size),
        }
    }
}

impl From<GridLayout> for Layout {
    fn from(l: GridLayout) -> Self {
        Layout::Grid(l)
    }
}

impl From<LinearLayout> for Layout {
    fn from(l: LinearLayout) -> Self {
        Layout::Linear(l)
    }
}

impl From<PackedLayout> for Layout {
    fn from(l: PackedLayout) -> Self {
        Layout::Packed(l)
    }
}

/// Layout engine names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutKind {
    Grid,
    Linear,
    #[default]
    Packed,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 3] = [LayoutKind::Grid, LayoutKind::Linear, LayoutKind::Packed];

    pub fn name(self) -> &'static str {
        match self {
            LayoutKind::Grid => "grid",
            LayoutKind::Linear => "linear",
            LayoutKind::Packed => "packed",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(LayoutKind::Grid),
            "linear" | "strip" => Ok(LayoutKind::Linear),
            "packed" | "pack" => Ok(LayoutKind::Packed),
            _ => Err(PipelineError::UnknownLayout(s.to_string())),
        }
    }
}

/// Flat, engine-agnostic layout options, as read from configuration.
///
/// Fields that do not apply to the chosen kind are ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutDescriptor {
    pub kind: LayoutKind,
    pub columns: Option<u32>,
    pub rows: Option<u32>,
    pub spacing: u32,
    pub padding: u32,
    pub direction: Direction,
    pub sort: SortOrder,
    pub grow: Option<bool>,
}

impl LayoutDescriptor {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Build the engine this descriptor names.
    pub fn build(&self) -> Layout {
        match self.kind {
            LayoutKind::Grid => GridLayout {
                columns: self.columns,
                rows: self.rows,
                spacing: self.spacing,
                padding: self.padding,
            }
            .into(),
            LayoutKind::Linear => LinearLayout {
                direction: self.direction,
                spacing: self.spacing,
                padding: self.padding,
            }
            .into(),
            LayoutKind::Packed => PackedLayout {
                sort: self.sort,
                spacing: self.spacing,
                padding: self.padding,
                grow: self.grow.unwrap_or(true),
            }
            .into(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::uniform;
    use super::*;

    #[test]
    fn test_kind_parse() {
        for kind in LayoutKind::ALL {
            assert_eq!(kind.name().parse::<LayoutKind>().unwrap(), kind);
        }
        assert_eq!(
            "hexagonal".parse::<LayoutKind>().unwrap_err(),
            PipelineError::UnknownLayout("hexagonal".into())
        );
    }

    #[test]
    fn test_overlap() {
        let a = FramePosition {
            frame_id: "a".into(),
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        };
        let mut b = FramePosition {
            frame_id: "b".into(),
            x: 10,
            y: 0,
            width: 5,
            height: 5,
        };
        assert!(!a.overlaps(&b));
        b.x = 9;
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_every_engine_rejects_empty() {
        for kind in LayoutKind::ALL {
            let err = LayoutDescriptor::new(kind).build().calculate(&[], None);
            assert_eq!(err.unwrap_err(), PipelineError::EmptyFrames, "{kind}");
        }
    }

    #[test]
    fn test_zero_sized_frame_rejected() {
        let frames = vec![FrameRect::new("a", 0, 4)];
        let err = LayoutDescriptor::new(LayoutKind::Grid)
            .build()
            .calculate(&frames, None)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_descriptor_builds_matching_kind() {
        for kind in LayoutKind::ALL {
            assert_eq!(LayoutDescriptor::new(kind).build().kind(), kind);
        }
        let Layout::Packed(packed) = LayoutDescriptor::new(LayoutKind::Packed).build() else {
            panic!("expected packed layout");
        };
        assert!(packed.grow);
    }

    #[test]
    fn test_can_fit() {
        let layout: Layout = LinearLayout::default().into();
        let frames = uniform(3, 10, 10);
        assert!(layout.can_fit(&frames, Size::new(30, 10)));
        assert!(!layout.can_fit(&frames, Size::new(29, 10)));
        assert!(!layout.can_fit(&[], Size::new(100, 100)));
    }
}
