//! Test fixtures and constants.

use pixelart::{Color, RasterImage};

/// Game Boy palette as configured by the `gameboy` preset
pub const GAMEBOY: [[u8; 3]; 4] = [[15, 56, 15], [48, 98, 48], [139, 172, 15], [155, 188, 15]];

/// A rendered-looking frame: diagonal gradient over a tinted base with a
/// transparent border, like a model rendered on a clear background.
pub fn rendered_frame(width: u32, height: u32, tint: [u8; 3]) -> RasterImage {
    RasterImage::from_fn(width, height, |x, y| {
        if x < 2 || y < 2 || x >= width - 2 || y >= height - 2 {
            return Color::TRANSPARENT;
        }
        let t = (x + y) as f32 / (width + height) as f32;
        let mix = |c: u8| (c as f32 * (1.0 - t) + 255.0 * t * 0.5).round() as u8;
        Color::rgb(mix(tint[0]), mix(tint[1]), mix(tint[2]))
    })
    .unwrap()
}

/// Encode a raster as an RGBA8 PNG
pub fn png_bytes(image: &RasterImage) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(image.data()).unwrap();
    }
    buf
}

/// Config with a grid layout whose sheet size is easy to compute by hand
pub fn grid_config(frames_yaml: &str, export_yaml: &str) -> String {
    format!(
        r#"algorithm: nearest-neighbor
palette: gameboy
settings:
  width: 16
  height: 16
  pixel_scale: 2
layout:
  type: grid
  spacing: 2
  padding: 4
{frames_yaml}
export:
{export_yaml}
"#
    )
}
