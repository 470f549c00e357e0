//! Assertion helpers for tests.

use pixelart::RasterImage;
use pixelsheet::services::decode_png;
use pretty_assertions::assert_eq;

use super::fixtures::GAMEBOY;

/// Assert bytes are a PNG and decode them
pub fn assert_png(bytes: &[u8]) -> RasterImage {
    assert!(
        bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
    decode_png(bytes).expect("PNG should decode")
}

/// Assert bytes are a RIFF/WEBP container
pub fn assert_webp(bytes: &[u8]) {
    assert!(bytes.len() > 12, "WebP too short: {} bytes", bytes.len());
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WEBP");
}

/// Assert every visible pixel is a Game Boy color and is fully opaque
pub fn assert_gameboy_only(image: &RasterImage) {
    for (i, px) in image.pixels().enumerate() {
        if px[3] == 0 {
            continue;
        }
        assert_eq!(px[3], 255, "pixel {i} is translucent: {px:?}");
        assert!(
            GAMEBOY.contains(&[px[0], px[1], px[2]]),
            "pixel {i} is not a Game Boy color: {px:?}"
        );
    }
}
