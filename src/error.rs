use std::path::PathBuf;

use pixelart::PipelineError;
use thiserror::Error;

/// Errors raised while reading or interpreting `pixelsheet.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Errors raised while encoding or writing a finished sheet.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("WebP encode error: {0}")]
    WebpEncode(String),

    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error of a sheet build.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load frame {path}: {message}")]
    FrameLoad { path: PathBuf, message: String },

    #[error("No input frames configured")]
    NoFrames,

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}
