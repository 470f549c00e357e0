//! pixelart: turn rendered frames into pixel-art sprites and sprite sheets
//!
//! The crate takes high-resolution RGBA frames (typically renders of a 3D
//! model), reduces each one to a clean, palette-quantized low-resolution
//! sprite, and arranges the results on a single sheet.
//!
//! # Quick Start
//!
//! ```
//! use pixelart::{
//!     assemble, AssembleOptions, Color, FrameRect, LayoutEngine, PackedLayout,
//!     PixelProcessor, PixelSettings, RasterImage, Registry,
//! };
//!
//! let registry = Registry::with_presets();
//! let processor = PixelProcessor::new(registry.algorithm("professional").unwrap());
//! let settings = PixelSettings::new(16, 16)
//!     .palette(registry.palette("pico8").unwrap().clone())
//!     .dithering(true);
//!
//! let renders: Vec<RasterImage> = (0..4)
//!     .map(|i| RasterImage::filled(64, 64, Color::rgb(i * 60, 100, 180)).unwrap())
//!     .collect();
//! let frames = processor.process_batch(&renders, &settings).unwrap();
//!
//! let rects: Vec<FrameRect> = frames.iter().map(FrameRect::from).collect();
//! let layout = PackedLayout::new(1, 2).calculate(&rects, None).unwrap();
//! let sheet = assemble(&layout, &frames, &AssembleOptions::default()).unwrap();
//!
//! assert_eq!(sheet.size(), layout.total_size);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! RasterImage ─► PixelAlgorithm (steps) ─► ProcessedFrame
//!                                              │
//!                      LayoutEngine ◄──────────┘
//!                           │
//!                           ▼
//!                  assemble ─► sheet RasterImage
//! ```
//!
//! - [`steps`]: the individual transforms (denoise, resize, quantize,
//!   dither, cleanup, adjust). Every step reads its input and returns a new
//!   image.
//! - [`PixelAlgorithm`]: one of three fixed step sequences, chosen by
//!   [`AlgorithmKind`].
//! - [`PixelProcessor`]: runs the current algorithm over one frame or a
//!   batch, numbering and timing each frame.
//! - [`layout`]: grid, linear and packed placement behind [`LayoutEngine`].
//! - [`assemble`]: draws frames at their positions.
//! - [`Registry`]: resolves palette, algorithm and layout names.
//!
//! # Color distance
//!
//! Nearest-color lookups use squared Euclidean distance in plain sRGB. Ties
//! go to the palette entry declared first.
//!
//! # Features
//!
//! - `parallel`: [`PixelProcessor::process_batch_parallel`] via rayon.

pub mod algorithm;
pub mod assembler;
pub mod error;
pub mod image;
pub mod layout;
pub mod palette;
pub mod processor;
pub mod registry;
pub mod settings;
pub mod steps;


pub use algorithm::{AlgorithmKind, PixelAlgorithm};
pub use assembler::{assemble, AssembleOptions};
pub use error::{ColorParseError, PipelineError, Result};
pub use image::{Color, RasterImage, Size};
pub use layout::{
    Direction, FramePosition, FrameRect, GridLayout, Layout, LayoutDescriptor, LayoutEngine,
    LayoutKind, LayoutResult, LinearLayout, PackedLayout, SortOrder,
};
pub use palette::ColorPalette;
pub use processor::{PixelProcessor, ProcessedFrame};
pub use registry::Registry;
pub use settings::PixelSettings;
pub use steps::ProcessingStep;
