//! Loading rendered frames from PNG files.

use pixelart::{PipelineError, RasterImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::SheetError;
use crate::models::FrameSource;

#[derive(Debug, Error)]
pub enum FrameDecodeError {
    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("unsupported color type: {0:?}")]
    UnsupportedColor(png::ColorType),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Decode PNG bytes into an RGBA raster.
///
/// Palette, grayscale and 16-bit images are normalized to 8-bit RGBA.
pub fn decode_png(bytes: &[u8]) -> Result<RasterImage, FrameDecodeError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let pixels = &buf[..info.buffer_size()];

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => return Err(FrameDecodeError::UnsupportedColor(other)),
    };

    Ok(RasterImage::new(info.width, info.height, rgba)?)
}

/// Read and decode one frame file.
pub fn load_frame(path: &Path) -> Result<RasterImage, SheetError> {
    let frame_err = |message: String| SheetError::FrameLoad {
        path: path.to_path_buf(),
        message,
    };
    let bytes = std::fs::read(path).map_err(|e| frame_err(e.to_string()))?;
    let image = decode_png(&bytes).map_err(|e| frame_err(e.to_string()))?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Loaded frame"
    );
    Ok(image)
}

/// Load every source, resolving relative paths against `base_dir`.
pub fn load_frames(sources: &[FrameSource], base_dir: &Path) -> Result<Vec<RasterImage>, SheetError> {
    sources
        .iter()
        .map(|source| load_frame(&resolve(base_dir, &source.path)))
        .collect()
}

pub fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelart::Color;

    fn encode(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buf
    }

    #[test]
    fn test_decode_rgba() {
        let data = [255, 0, 0, 255, 0, 0, 255, 128];
        let image = decode_png(&encode(2, 1, png::ColorType::Rgba, &data)).unwrap();
        assert_eq!(image.data(), &data);
    }

    #[test]
    fn test_decode_rgb_is_opaque() {
        let image = decode_png(&encode(1, 2, png::ColorType::Rgb, &[1, 2, 3, 4, 5, 6])).unwrap();
        assert_eq!(image.pixel(0, 0), [1, 2, 3, 255]);
        assert_eq!(image.pixel(0, 1), [4, 5, 6, 255]);
    }

    #[test]
    fn test_decode_grayscale() {
        let image = decode_png(&encode(2, 1, png::ColorType::Grayscale, &[0, 200])).unwrap();
        assert_eq!(image.pixel(1, 0), Color::rgb(200, 200, 200).to_array());
    }

    #[test]
    fn test_decode_gray_alpha() {
        let image = decode_png(&encode(1, 1, png::ColorType::GrayscaleAlpha, &[90, 10])).unwrap();
        assert_eq!(image.pixel(0, 0), [90, 90, 90, 10]);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_png(b"definitely not a png"),
            Err(FrameDecodeError::Decode(_))
        ));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load_frame(Path::new("/nonexistent/walk_0.png")).unwrap_err();
        match err {
            SheetError::FrameLoad { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/walk_0.png"))
            }
            other => panic!("Expected FrameLoad, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = Path::new("/project");
        assert_eq!(
            resolve(base, Path::new("frames/a.png")),
            PathBuf::from("/project/frames/a.png")
        );
        assert_eq!(
            resolve(base, Path::new("/abs/b.png")),
            PathBuf::from("/abs/b.png")
        );
    }
}
