use std::fmt;
use std::str::FromStr;

use super::{ensure_frames, FramePosition, FrameRect, LayoutEngine, LayoutResult};
use crate::error::{PipelineError, Result};
use crate::image::Size;

/// Strip direction of a [`LinearLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
        })
    }
}

impl FromStr for Direction {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(Direction::Horizontal),
            "vertical" | "v" => Ok(Direction::Vertical),
            _ => Err(PipelineError::InvalidSettings(format!(
                "unknown direction: {s}"
            ))),
        }
    }
}

/// All frames in one row or one column, in input order.
///
/// The main axis is the sum of extents plus spacing between frames; the
/// cross axis is the largest extent. Both carry padding on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinearLayout {
    pub direction: Direction,
    pub spacing: u32,
    pub padding: u32,
}

impl LinearLayout {
    pub fn new(direction: Direction, spacing: u32, padding: u32) -> Self {
        Self {
            direction,
            spacing,
            padding,
        }
    }
}

impl LayoutEngine for LinearLayout {
    /// `max_size` is not enforced; use [`LayoutEngine::can_fit`] to check.
    fn calculate(&self, frames: &[FrameRect], _max_size: Option<Size>) -> Result<LayoutResult> {
        ensure_frames(frames)?;

        let horizontal = self.direction == Direction::Horizontal;
        let mut cursor = self.padding;
        let mut cross = 0;
        let mut positions = Vec::with_capacity(frames.len());

        for f in frames {
            let (x, y) = if horizontal {
                (cursor, self.padding)
            } else {
                (self.padding, cursor)
            };
            positions.push(FramePosition {
                frame_id: f.id.clone(),
                x,
                y,
                width: f.width,
                height: f.height,
            });

            let (main, other) = if horizontal {
                (f.width, f.height)
            } else {
                (f.height, f.width)
            };
            cursor = cursor.saturating_add(main).saturating_add(self.spacing);
            cross = cross.max(other);
        }

        // The loop added one spacing too many after the last frame.
        let main_total = cursor
            .saturating_sub(self.spacing)
            .saturating_add(self.padding);
        let cross_total = cross.saturating_add(self.padding.saturating_mul(2));
        let total_size = if horizontal {
            Size::new(main_total, cross_total)
        } else {
            Size::new(cross_total, main_total)
        };

        Ok(LayoutResult {
            positions,
            total_size,
            skipped: Vec::new(),
        })
    }
}
