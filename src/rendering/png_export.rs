//! PNG encoding of finished sheets.
//!
//! Pixel-art sheets rarely use more than a few dozen colors, so a sheet with
//! at most 256 distinct RGBA values is written as an indexed PNG (1, 2, 4 or
//! 8 bits per pixel, with a tRNS chunk when any entry is translucent).
//! Anything richer falls back to plain RGBA8.

use pixelart::RasterImage;
use std::collections::HashMap;
use std::io::Cursor;

use crate::error::ExportError;

/// Encode `image` as PNG, optionally re-compressing with oxipng.
pub fn encode_png(image: &RasterImage, optimize: bool) -> Result<Vec<u8>, ExportError> {
    let png_bytes = match index_colors(image) {
        Some((palette, indices)) => encode_indexed(image, &palette, &indices, optimize)?,
        None => encode_png_raw(
            image.width(),
            image.height(),
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            None,
            None,
            image.data(),
            optimize,
        )?,
    };

    if !optimize {
        return Ok(png_bytes);
    }

    // Re-compress with oxipng (zopfli + adaptive filter selection)
    match oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    ) {
        Ok(optimized) => {
            tracing::debug!(
                before = png_bytes.len(),
                after = optimized.len(),
                "Optimized PNG"
            );
            Ok(optimized)
        }
        Err(e) => {
            tracing::warn!(%e, "oxipng failed, keeping unoptimized PNG");
            Ok(png_bytes)
        }
    }
}

/// Palette in first-seen order plus one index per pixel, or `None` when the
/// image has more than 256 distinct colors.
fn index_colors(image: &RasterImage) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::new();
    let mut palette = Vec::new();
    let mut indices = Vec::with_capacity(image.width() as usize * image.height() as usize);

    for px in image.pixels() {
        let idx = match lookup.get(&px) {
            Some(&idx) => idx,
            None => {
                if palette.len() == 256 {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(px);
                lookup.insert(px, idx);
                idx
            }
        };
        indices.push(idx);
    }
    Some((palette, indices))
}

fn encode_indexed(
    image: &RasterImage,
    palette: &[[u8; 4]],
    indices: &[u8],
    fast: bool,
) -> Result<Vec<u8>, ExportError> {
    let (depth, bits) = match palette.len() {
        0..=2 => (png::BitDepth::One, 1),
        3..=4 => (png::BitDepth::Two, 2),
        5..=16 => (png::BitDepth::Four, 4),
        _ => (png::BitDepth::Eight, 8),
    };
    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let trns: Option<Vec<u8>> = palette
        .iter()
        .any(|c| c[3] < 255)
        .then(|| palette.iter().map(|c| c[3]).collect());
    let packed = if bits == 8 {
        indices.to_vec()
    } else {
        pack_nbits(indices, image.width(), bits)
    };

    encode_png_raw(
        image.width(),
        image.height(),
        png::ColorType::Indexed,
        depth,
        Some(plte.as_slice()),
        trns.as_deref(),
        &packed,
        fast,
    )
}

/// Encode packed pixel data as a PNG.
#[allow(clippy::too_many_arguments)]
fn encode_png_raw(
    width: u32,
    height: u32,
    color_type: png::ColorType,
    bit_depth: png::BitDepth,
    plte: Option<&[u8]>,
    trns: Option<&[u8]>,
    packed: &[u8],
    fast: bool,
) -> Result<Vec<u8>, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        if fast {
            // oxipng will re-compress optimally
            encoder.set_compression(png::Compression::Fast);
            encoder.set_filter(png::FilterType::NoFilter);
        }
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        if let Some(trns) = trns {
            encoder.set_trns(trns);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(packed)
            .map_err(|e| ExportError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Pack palette indices `bits` at a time, most significant bits first.
///
/// Each row starts on a fresh byte; the unused low bits of a row's last
/// byte stay zero.
fn pack_nbits(indices: &[u8], width: u32, bits: u8) -> Vec<u8> {
    let per_byte = usize::from(8 / bits);
    let mask = (1u8 << bits) - 1;

    indices
        .chunks(width as usize)
        .flat_map(|row| row.chunks(per_byte))
        .map(|group| {
            let byte = group
                .iter()
                .fold(0u8, |acc, &idx| (acc << bits) | (idx & mask));
            // Left-align a short trailing group
            byte << (bits as usize * (per_byte - group.len()))
        })
        .collect()
}
