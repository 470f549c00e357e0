//! Error types for the pixel-art pipeline.
//!
//! [`PipelineError`] is the single error type returned by steps, algorithms,
//! the processor, layout engines and the assembler. Errors propagate
//! unchanged from the step that raised them up to the caller.

use thiserror::Error;

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// Hex string has invalid length (3, 6 or 8 digits after stripping '#')
    #[error("invalid hex color length (expected 3, 6 or 8 characters)")]
    InvalidLength,

    /// Invalid hexadecimal character encountered
    #[error("invalid hex character: {0:?}")]
    InvalidHex(char),
}

/// Unified error type for the pixel-art pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// A batch or layout was asked to work on zero frames
    #[error("no frames to process")]
    EmptyFrames,

    /// Width or height of zero
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer does not match `width * height * 4`
    #[error("pixel buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// A settings or layout value is out of range
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown layout type: {0}")]
    UnknownLayout(String),

    #[error("unknown palette: {0}")]
    UnknownPalette(String),

    /// A layout position references a frame that was not supplied
    #[error("unknown frame id: {0}")]
    UnknownFrame(String),

    /// Palette definition is invalid (empty, duplicate id, bad color)
    #[error("palette error: {0}")]
    Palette(String),

    /// The resampler could not allocate a surface
    #[error("resample failed: {0}")]
    Resample(String),
}

impl From<ColorParseError> for PipelineError {
    fn from(err: ColorParseError) -> Self {
        PipelineError::Palette(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_length_message() {
        let err = PipelineError::BufferLength {
            expected: 16,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "pixel buffer length mismatch: expected 16 bytes, got 12"
        );
    }

    #[test]
    fn test_unknown_identifiers_name_the_identifier() {
        assert_eq!(
            PipelineError::UnknownAlgorithm("lanczos".into()).to_string(),
            "unknown algorithm: lanczos"
        );
        assert_eq!(
            PipelineError::UnknownLayout("spiral".into()).to_string(),
            "unknown layout type: spiral"
        );
        assert_eq!(
            PipelineError::UnknownPalette("nes".into()).to_string(),
            "unknown palette: nes"
        );
    }

    #[test]
    fn test_color_parse_error_converts() {
        let err: PipelineError = ColorParseError::InvalidLength.into();
        match err {
            PipelineError::Palette(msg) => assert!(msg.contains("invalid hex color length")),
            other => panic!("Expected Palette variant, got {other:?}"),
        }
    }
}
