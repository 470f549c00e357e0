use image::codecs::webp::WebPEncoder;
use image::ExtendedColorType;
use pixelart::RasterImage;

use crate::error::ExportError;

/// Encode `image` as lossless WebP.
pub fn encode_webp(image: &RasterImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    WebPEncoder::new_lossless(&mut buf)
        .encode(
            image.data(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| ExportError::WebpEncode(e.to_string()))?;
    Ok(buf)
}
