use super::{ensure_frames, FramePosition, FrameRect, LayoutEngine, LayoutResult};
use crate::error::{PipelineError, Result};
use crate::image::Size;

/// Uniform cells in row-major order.
///
/// Every cell is as large as the largest frame, so mixed frame sizes never
/// overlap. Frame `i` lands in column `i % columns`, row `i / columns`.
///
/// Column and row counts resolve in this order:
///
/// 1. both given: `rows` is raised if it cannot hold every frame
/// 2. `columns` only: rows follow
/// 3. `rows` only: columns follow
/// 4. neither: `ceil(sqrt(n))` columns, reduced until the sheet fits the
///    width of `max_size` (never below one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridLayout {
    pub columns: Option<u32>,
    pub rows: Option<u32>,
    pub spacing: u32,
    pub padding: u32,
}

fn ceil_div(a: u32, b: u32) -> u32 {
    a.div_ceil(b)
}

fn ceil_sqrt(n: u32) -> u32 {
    let mut c = 1;
    while c * c < n {
        c += 1;
    }
    c
}

impl GridLayout {
    pub fn new(spacing: u32, padding: u32) -> Self {
        Self {
            spacing,
            padding,
            ..Self::default()
        }
    }

    pub fn columns(mut self, columns: u32) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    fn extent(&self, cells: u32, cell: u32) -> u32 {
        cells
            .saturating_mul(cell)
            .saturating_add(cells.saturating_sub(1).saturating_mul(self.spacing))
            .saturating_add(self.padding.saturating_mul(2))
    }

    fn dimensions(&self, n: u32, cell: Size, max_size: Option<Size>) -> Result<(u32, u32)> {
        if self.columns == Some(0) || self.rows == Some(0) {
            return Err(PipelineError::InvalidSettings(
                "grid columns and rows must be at least 1".into(),
            ));
        }

        Ok(match (self.columns, self.rows) {
            (Some(cols), Some(rows)) => (cols, rows.max(ceil_div(n, cols))),
            (Some(cols), None) => (cols, ceil_div(n, cols)),
            (None, Some(rows)) => {
                let cols = ceil_div(n, rows);
                (cols, ceil_div(n, cols))
            }
            (None, None) => {
                let mut cols = ceil_sqrt(n);
                if let Some(max) = max_size {
                    while cols > 1 && self.extent(cols, cell.width) > max.width {
                        cols -= 1;
                    }
                }
                (cols, ceil_div(n, cols))
            }
        })
    }
}

impl LayoutEngine for GridLayout {
    fn calculate(&self, frames: &[FrameRect], max_size: Option<Size>) -> Result<LayoutResult> {
        ensure_frames(frames)?;

        let cell = Size::new(
            frames.iter().map(|f| f.width).max().unwrap_or(0),
            frames.iter().map(|f| f.height).max().unwrap_or(0),
        );
        let (cols, rows) = self.dimensions(frames.len() as u32, cell, max_size)?;
        let step = Size::new(
            cell.width.saturating_add(self.spacing),
            cell.height.saturating_add(self.spacing),
        );

        let positions = frames
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let (col, row) = (i as u32 % cols, i as u32 / cols);
                FramePosition {
                    frame_id: f.id.clone(),
                    x: self.padding.saturating_add(col.saturating_mul(step.width)),
                    y: self.padding.saturating_add(row.saturating_mul(step.height)),
                    width: f.width,
                    height: f.height,
                }
            })
            .collect();

        Ok(LayoutResult {
            positions,
            total_size: Size::new(
                self.extent(cols, cell.width),
                self.extent(rows, cell.height),
            ),
            skipped: Vec::new(),
        })
    }
}
