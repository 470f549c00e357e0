//! Resizing to the target sprite size.
//!
//! [`SmartResize`] is the hand-rolled, deterministic path: an exact box
//! filter (area averaging) whenever either dimension shrinks, bicubic
//! interpolation when the image only grows. [`SmoothResize`] hands the work
//! to tiny-skia's pixmap resampler.

use tiny_skia::{BlendMode, FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};

use super::ProcessingStep;
use crate::error::{PipelineError, Result};
use crate::image::{clamp_channel, RasterImage, Size};
use crate::settings::PixelSettings;

/// Bicubic kernel parameter (Catmull-Rom family).
const BICUBIC_A: f32 = -0.5;

fn target_size(settings: &PixelSettings) -> Result<Size> {
    let size = settings.target_size;
    if size.width == 0 || size.height == 0 {
        return Err(PipelineError::InvalidSettings(format!(
            "resize target must be non-zero, got {}x{}",
            size.width, size.height
        )));
    }
    Ok(size)
}

/// Area-average downscale or bicubic upscale to `settings.target_size`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartResize;

impl ProcessingStep for SmartResize {
    fn name(&self) -> &'static str {
        "smart-resize"
    }

    fn execute(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage> {
        let target = target_size(settings)?;
        if target == input.size() {
            return Ok(input.clone());
        }
        if target.width < input.width() || target.height < input.height() {
            area_average(input, target)
        } else {
            bicubic(input, target)
        }
    }
}

/// Source coverage of each destination cell along one axis.
///
/// Destination cell `d` covers `[d·scale, (d+1)·scale)` in source units; each
/// entry lists the source indices it touches with their overlap length.
fn axis_coverage(src_len: u32, dst_len: u32) -> Vec<Vec<(usize, f64)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * scale;
            let end = ((d + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len as usize);
            (first..last)
                .filter_map(|s| {
                    let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                    (overlap > 0.0).then_some((s, overlap))
                })
                .collect()
        })
        .collect()
}

/// Exact box filter: every source pixel contributes in proportion to the
/// area it shares with the destination pixel's footprint.
fn area_average(input: &RasterImage, target: Size) -> Result<RasterImage> {
    let cols = axis_coverage(input.width(), target.width);
    let rows = axis_coverage(input.height(), target.height);
    let src = input.data();
    let mut data = Vec::with_capacity(target.area() as usize * 4);

    for row in &rows {
        for col in &cols {
            let mut sum = [0.0f64; 4];
            let mut total = 0.0f64;
            for &(sy, wy) in row {
                for &(sx, wx) in col {
                    let weight = wx * wy;
                    let i = input.offset(sx, sy);
                    for c in 0..4 {
                        sum[c] += src[i + c] as f64 * weight;
                    }
                    total += weight;
                }
            }
            for s in sum {
                let v = if total > 0.0 { s / total } else { 0.0 };
                data.push(clamp_channel(v as f32));
            }
        }
    }

    RasterImage::new(target.width, target.height, data)
}

/// Cubic convolution kernel with `a = -0.5`.
#[inline]
fn cubic_weight(x: f32) -> f32 {
    let x = x.abs();
    if x <= 1.0 {
        (BICUBIC_A + 2.0) * x * x * x - (BICUBIC_A + 3.0) * x * x + 1.0
    } else if x < 2.0 {
        BICUBIC_A * x * x * x - 5.0 * BICUBIC_A * x * x + 8.0 * BICUBIC_A * x - 4.0 * BICUBIC_A
    } else {
        0.0
    }
}

/// Four clamped source taps and their weights for one destination index.
fn cubic_taps(dst: u32, src_len: u32, dst_len: u32) -> [(usize, f32); 4] {
    let scale = src_len as f32 / dst_len as f32;
    // Pixel centers aligned: dst center (d + 0.5) maps to src (d + 0.5)·scale
    let s = (dst as f32 + 0.5) * scale - 0.5;
    let base = s.floor();
    let max = src_len as isize - 1;
    let mut taps = [(0usize, 0.0f32); 4];
    for (k, tap) in taps.iter_mut().enumerate() {
        let pos = base + k as f32 - 1.0;
        let idx = (pos as isize).clamp(0, max) as usize;
        *tap = (idx, cubic_weight(s - pos));
    }
    taps
}

/// Bicubic interpolation over a 4×4 neighborhood, samples clamped to the
/// image bounds.
fn bicubic(input: &RasterImage, target: Size) -> Result<RasterImage> {
    let src = input.data();
    let col_taps: Vec<_> = (0..target.width)
        .map(|x| cubic_taps(x, input.width(), target.width))
        .collect();
    let mut data = Vec::with_capacity(target.area() as usize * 4);

    for y in 0..target.height {
        let row_taps = cubic_taps(y, input.height(), target.height);
        for taps_x in &col_taps {
            let mut sum = [0.0f32; 4];
            for &(sy, wy) in &row_taps {
                for &(sx, wx) in taps_x {
                    let weight = wx * wy;
                    let i = input.offset(sx, sy);
                    for c in 0..4 {
                        sum[c] += src[i + c] as f32 * weight;
                    }
                }
            }
            data.extend(sum.map(clamp_channel));
        }
    }

    RasterImage::new(target.width, target.height, data)
}

/// Sampling quality for [`SmoothResize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleQuality {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
}

impl From<ResampleQuality> for FilterQuality {
    fn from(quality: ResampleQuality) -> Self {
        match quality {
            ResampleQuality::Nearest => FilterQuality::Nearest,
            ResampleQuality::Bilinear => FilterQuality::Bilinear,
            ResampleQuality::Bicubic => FilterQuality::Bicubic,
        }
    }
}

/// Resize through tiny-skia's pixmap resampler.
///
/// tiny-skia stores premultiplied alpha, so pixels are premultiplied on the
/// way in and demultiplied on the way out.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothResize {
    pub quality: ResampleQuality,
}

impl SmoothResize {
    pub fn new(quality: ResampleQuality) -> Self {
        Self { quality }
    }
}

impl ProcessingStep for SmoothResize {
    fn name(&self) -> &'static str {
        "smooth-resize"
    }

    fn execute(&self, input: &RasterImage, settings: &PixelSettings) -> Result<RasterImage> {
        let target = target_size(settings)?;
        if target == input.size() {
            return Ok(input.clone());
        }

        let src = to_pixmap(input)?;
        let mut dst = Pixmap::new(target.width, target.height).ok_or_else(|| {
            PipelineError::Resample(format!(
                "cannot allocate {}x{} pixmap",
                target.width, target.height
            ))
        })?;

        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::Source,
            quality: self.quality.into(),
        };
        let transform = Transform::from_scale(
            target.width as f32 / input.width() as f32,
            target.height as f32 / input.height() as f32,
        );
        dst.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);

        from_pixmap(&dst)
    }
}

fn to_pixmap(image: &RasterImage) -> Result<Pixmap> {
    let mut data = image.data().to_vec();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    let size = IntSize::from_wh(image.width(), image.height()).ok_or(
        PipelineError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        },
    )?;
    Pixmap::from_vec(data, size)
        .ok_or_else(|| PipelineError::Resample("cannot wrap source pixels".into()))
}

fn from_pixmap(pixmap: &Pixmap) -> Result<RasterImage> {
    let mut data = pixmap.data().to_vec();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
    RasterImage::new(pixmap.width(), pixmap.height(), data)
}
