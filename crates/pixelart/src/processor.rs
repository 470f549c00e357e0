//! Frame processing: runs one algorithm over one or many rendered frames.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::algorithm::{AlgorithmKind, PixelAlgorithm};
use crate::error::{PipelineError, Result};
use crate::image::RasterImage;
use crate::settings::PixelSettings;

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique frame identifier.
fn next_frame_id() -> String {
    let n = NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed);
    format!("frame-{n:08x}")
}

/// The result of processing one rendered frame.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    id: String,
    original: RasterImage,
    processed: RasterImage,
    frame_number: usize,
    animation: Option<String>,
    processing_time: Duration,
}

impl ProcessedFrame {
    /// Unique id, used by layouts and the assembler to match frames.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn original(&self) -> &RasterImage {
        &self.original
    }

    #[inline]
    pub fn processed(&self) -> &RasterImage {
        &self.processed
    }

    #[inline]
    pub fn frame_number(&self) -> usize {
        self.frame_number
    }

    #[inline]
    pub fn animation(&self) -> Option<&str> {
        self.animation.as_deref()
    }

    #[inline]
    pub fn processing_time(&self) -> Duration {
        self.processing_time
    }

    /// Tag the frame as part of a named animation.
    pub fn with_animation(mut self, name: impl Into<String>) -> Self {
        self.animation = Some(name.into());
        self
    }
}

/// Runs the current [`PixelAlgorithm`] over frames.
///
/// Swapping the algorithm takes `&mut self`, so it cannot race with an
/// in-flight `process` call.
///
/// ```
/// use pixelart::{AlgorithmKind, Color, PixelProcessor, PixelSettings, RasterImage};
///
/// let mut processor = PixelProcessor::new(AlgorithmKind::NearestNeighbor.into());
/// let frame = RasterImage::filled(32, 32, Color::rgb(200, 40, 40)).unwrap();
///
/// let sprite = processor.process(&frame, &PixelSettings::new(8, 8)).unwrap();
/// assert_eq!(sprite.processed().width(), 8);
///
/// processor.set_algorithm(AlgorithmKind::Professional.into());
/// assert_eq!(processor.algorithm().kind(), AlgorithmKind::Professional);
/// ```
#[derive(Debug, Clone)]
pub struct PixelProcessor {
    algorithm: PixelAlgorithm,
}

impl Default for PixelProcessor {
    fn default() -> Self {
        Self::new(PixelAlgorithm::new(AlgorithmKind::default()))
    }
}

impl PixelProcessor {
    pub fn new(algorithm: PixelAlgorithm) -> Self {
        Self { algorithm }
    }

    #[inline]
    pub fn algorithm(&self) -> &PixelAlgorithm {
        &self.algorithm
    }

    /// Replace the algorithm for subsequent calls.
    pub fn set_algorithm(&mut self, algorithm: PixelAlgorithm) {
        tracing::debug!(
            from = self.algorithm.name(),
            to = algorithm.name(),
            "switching algorithm"
        );
        self.algorithm = algorithm;
    }

    /// Process a single frame. The result carries frame number 0.
    ///
    /// # Errors
    ///
    /// Any error from the algorithm is returned unchanged; no partial frame
    /// is produced.
    pub fn process(&self, image: &RasterImage, settings: &PixelSettings) -> Result<ProcessedFrame> {
        self.process_numbered(image, settings, 0)
    }

    fn process_numbered(
        &self,
        image: &RasterImage,
        settings: &PixelSettings,
        frame_number: usize,
    ) -> Result<ProcessedFrame> {
        let start = Instant::now();
        let processed = self.algorithm.apply(image, settings)?;
        let processing_time = start.elapsed();

        let frame = ProcessedFrame {
            id: next_frame_id(),
            original: image.clone(),
            processed,
            frame_number,
            animation: None,
            processing_time,
        };
        tracing::debug!(
            id = %frame.id,
            frame_number,
            algorithm = self.algorithm.name(),
            elapsed_ms = processing_time.as_secs_f64() * 1000.0,
            "processed frame"
        );
        Ok(frame)
    }

    /// Process frames in order, numbering them `0..N`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyFrames`] for an empty slice, otherwise the first
    /// frame error.
    pub fn process_batch(
        &self,
        images: &[RasterImage],
        settings: &PixelSettings,
    ) -> Result<Vec<ProcessedFrame>> {
        if images.is_empty() {
            return Err(PipelineError::EmptyFrames);
        }
        settings.validate()?;

        images
            .iter()
            .enumerate()
            .map(|(n, image)| self.process_numbered(image, settings, n))
            .collect()
    }

    /// Like [`process_batch`](Self::process_batch) but spread across the
    /// rayon thread pool. Output order and numbering match the input.
    #[cfg(feature = "parallel")]
    pub fn process_batch_parallel(
        &self,
        images: &[RasterImage],
        settings: &PixelSettings,
    ) -> Result<Vec<ProcessedFrame>> {
        use rayon::prelude::*;

        if images.is_empty() {
            return Err(PipelineError::EmptyFrames);
        }
        settings.validate()?;

        images
            .par_iter()
            .enumerate()
            .map(|(n, image)| self.process_numbered(image, settings, n))
            .collect()
    }
}
