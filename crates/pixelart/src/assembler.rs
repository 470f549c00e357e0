//! Composite processed frames into a single sprite sheet raster.

use std::collections::HashMap;

use crate::error::{PipelineError, Result};
use crate::image::{clamp_channel, Color, RasterImage};
use crate::layout::LayoutResult;
use crate::processor::ProcessedFrame;

/// Options for [`assemble`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Sheet fill before frames are drawn. Transparent by default.
    pub background: Option<Color>,
    /// Integer nearest-neighbor magnification of the finished sheet.
    pub scale: u32,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            background: None,
            scale: 1,
        }
    }
}

/// Source-over blend of one straight-alpha pixel onto another.
fn blend(dst: &mut [u8], src: [u8; 4]) {
    match src[3] {
        255 => dst.copy_from_slice(&src),
        0 => {}
        a => {
            let sa = a as f32 / 255.0;
            let da = dst[3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            for c in 0..3 {
                let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
                dst[c] = clamp_channel(v);
            }
            dst[3] = clamp_channel(out_a * 255.0);
        }
    }
}

/// Draw every frame at its layout position.
///
/// Frames are matched to positions by id and drawn in layout order, so later
/// positions win where they overlap. Frames without a position (for example
/// skipped by the packer) are not drawn.
///
/// # Errors
///
/// - [`PipelineError::InvalidDimensions`] for a zero-sized layout
/// - [`PipelineError::UnknownFrame`] when a position names a frame not in
///   `frames`
/// - [`PipelineError::InvalidSettings`] for `scale == 0`
pub fn assemble(
    layout: &LayoutResult,
    frames: &[ProcessedFrame],
    options: &AssembleOptions,
) -> Result<RasterImage> {
    if options.scale == 0 {
        return Err(PipelineError::InvalidSettings(
            "sheet scale must be at least 1".into(),
        ));
    }

    let size = layout.total_size;
    let mut sheet = RasterImage::filled(
        size.width,
        size.height,
        options.background.unwrap_or(Color::TRANSPARENT),
    )?;

    let by_id: HashMap<&str, &ProcessedFrame> = frames.iter().map(|f| (f.id(), f)).collect();

    for pos in &layout.positions {
        let frame = by_id
            .get(pos.frame_id.as_str())
            .ok_or_else(|| PipelineError::UnknownFrame(pos.frame_id.clone()))?;
        let img = frame.processed();

        // Clip to both the declared slot and the sheet.
        let w = pos.width.min(img.width()).min(size.width.saturating_sub(pos.x));
        let h = pos.height.min(img.height()).min(size.height.saturating_sub(pos.y));

        for y in 0..h {
            for x in 0..w {
                let src = img.pixel(x, y);
                let i = sheet.offset((pos.x + x) as usize, (pos.y + y) as usize);
                blend(&mut sheet.data_mut()[i..i + 4], src);
            }
        }
    }

    tracing::debug!(
        width = size.width,
        height = size.height,
        frames = layout.positions.len(),
        scale = options.scale,
        "assembled sheet"
    );

    sheet.scale_nearest(options.scale)
}
