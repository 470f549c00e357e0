use std::path::{Path, PathBuf};

use pixelart::{
    assemble, AssembleOptions, Color, FrameRect, Layout, LayoutEngine, LayoutResult,
    PixelProcessor, PixelSettings, ProcessedFrame, RasterImage, Size,
};

use crate::error::{ExportError, SheetError};
use crate::models::{AppConfig, ExportFormat, FrameSource};
use crate::rendering::{encode_png, encode_webp, SheetMetadata};
use crate::services::frame_loader::{load_frames, resolve};

/// Everything produced by one build, before anything is written
pub struct SheetBuild {
    pub frames: Vec<ProcessedFrame>,
    pub layout: LayoutResult,
    pub sheet: RasterImage,
    /// Input file of each frame, indexed by frame number
    pub sources: Vec<FrameSource>,
}

/// What an export wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub sheet_size: Size,
    pub frames: usize,
    pub skipped: Vec<String>,
}

/// Pipeline that orchestrates load → process → layout → assemble → export
pub struct SheetPipeline {
    config: AppConfig,
    base_dir: PathBuf,
    processor: PixelProcessor,
    settings: PixelSettings,
    layout: Layout,
    background: Option<Color>,
}

impl SheetPipeline {
    /// Resolve every configured name up front. Relative paths in `config`
    /// are taken relative to `base_dir`.
    pub fn new(config: AppConfig, base_dir: impl Into<PathBuf>) -> Result<Self, SheetError> {
        config.validate()?;
        let registry = config.build_registry()?;
        let processor = PixelProcessor::new(registry.algorithm(&config.algorithm)?);
        let settings = config.pixel_settings(&registry)?;
        let layout = registry.layout(&config.layout_descriptor()?);
        let background = config.background()?;

        tracing::debug!(
            algorithm = processor.algorithm().name(),
            layout = %layout.kind(),
            palette = settings.palette.as_ref().map(|p| p.id()),
            "Pipeline configured"
        );

        Ok(Self {
            config,
            base_dir: base_dir.into(),
            processor,
            settings,
            layout,
            background,
        })
    }

    /// Load a configuration file; its directory becomes the base directory.
    pub fn from_file(path: &Path) -> Result<Self, SheetError> {
        let config = AppConfig::load(path)?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        Self::new(config, base_dir)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn settings(&self) -> &PixelSettings {
        &self.settings
    }

    /// Override the configured output path.
    pub fn set_output(&mut self, output: impl Into<PathBuf>) {
        self.config.export.output = output.into();
    }

    /// Resolved input frame files, in sheet order
    pub fn input_paths(&self) -> Vec<PathBuf> {
        self.config
            .frame_sources()
            .iter()
            .map(|s| resolve(&self.base_dir, &s.path))
            .collect()
    }

    /// Main output file; its extension always matches the export format.
    pub fn output_path(&self) -> PathBuf {
        let export = &self.config.export;
        resolve(&self.base_dir, &export.output).with_extension(export.format.extension())
    }

    /// Paths the next export will write
    pub fn output_paths(&self) -> Vec<PathBuf> {
        let main = self.output_path();
        let export = &self.config.export;
        if export.metadata && export.format != ExportFormat::Json {
            vec![main.clone(), main.with_extension("json")]
        } else {
            vec![main]
        }
    }

    pub fn build(&self) -> Result<SheetBuild, SheetError> {
        let sources = self.config.frame_sources();
        if sources.is_empty() {
            return Err(SheetError::NoFrames);
        }

        let images = load_frames(&sources, &self.base_dir)?;
        tracing::info!(count = images.len(), "Loaded frames");

        let frames: Vec<ProcessedFrame> = self
            .processor
            .process_batch_parallel(&images, &self.settings)?
            .into_iter()
            .zip(&sources)
            .map(|(frame, source)| match &source.animation {
                Some(name) => frame.with_animation(name.as_str()),
                None => frame,
            })
            .collect();
        tracing::info!(
            count = frames.len(),
            algorithm = self.processor.algorithm().name(),
            "Processed frames"
        );

        let rects: Vec<FrameRect> = frames.iter().map(FrameRect::from).collect();
        let layout = self.layout.calculate(&rects, self.config.max_size())?;
        tracing::info!(
            kind = %self.layout.kind(),
            width = layout.total_size.width,
            height = layout.total_size.height,
            placed = layout.positions.len(),
            skipped = layout.skipped.len(),
            "Laid out sheet"
        );

        let sheet = assemble(
            &layout,
            &frames,
            &AssembleOptions {
                background: self.background,
                scale: self.settings.pixel_scale,
            },
        )?;

        Ok(SheetBuild {
            frames,
            layout,
            sheet,
            sources,
        })
    }

    pub fn export(&self, build: &SheetBuild) -> Result<ExportReport, SheetError> {
        let export = &self.config.export;
        let output = self.output_path();
        let scale = self.settings.pixel_scale;
        let metadata = || {
            SheetMetadata::build(
                &build.layout,
                &build.frames,
                &build.sources,
                &self.config.animations,
                scale,
            )
        };

        let mut written = Vec::new();
        match export.format {
            ExportFormat::Json => {
                write_file(&output, metadata().to_json().map_err(ExportError::from)?.as_bytes())?;
                written.push(output);
            }
            format => {
                let bytes = match format {
                    ExportFormat::Webp => encode_webp(&build.sheet)?,
                    _ => encode_png(&build.sheet, export.optimize)?,
                };
                write_file(&output, &bytes)?;

                if export.metadata {
                    let mut meta = metadata();
                    if let Some(name) = output.file_name() {
                        meta = meta.with_image(name.to_string_lossy());
                    }
                    let sidecar = output.with_extension("json");
                    write_file(&sidecar, meta.to_json().map_err(ExportError::from)?.as_bytes())?;
                    written.insert(0, sidecar);
                }
                written.insert(0, output);
            }
        }

        for path in &written {
            tracing::info!(path = %path.display(), "Wrote");
        }

        Ok(ExportReport {
            written,
            sheet_size: build.sheet.size(),
            frames: build.layout.positions.len(),
            skipped: build.layout.skipped.clone(),
        })
    }

    /// Build and export in one go
    pub fn run(&self) -> Result<ExportReport, SheetError> {
        let build = self.build()?;
        self.export(&build)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn pipeline(yaml: &str) -> SheetPipeline {
        SheetPipeline::new(AppConfig::from_yaml(yaml).unwrap(), "/project").unwrap()
    }

    #[test]
    fn test_output_extension_follows_format() {
        let p = pipeline("export:\n  format: webp\n  output: out/sheet.png\n");
        assert_eq!(p.output_path(), PathBuf::from("/project/out/sheet.webp"));
        assert_eq!(
            p.output_paths(),
            vec![
                PathBuf::from("/project/out/sheet.webp"),
                PathBuf::from("/project/out/sheet.json"),
            ]
        );
    }

    #[test]
    fn test_json_format_writes_single_file() {
        let p = pipeline("export:\n  format: json\n");
        assert_eq!(p.output_paths(), vec![PathBuf::from("/project/sheet.json")]);
    }

    #[test]
    fn test_input_paths_resolved() {
        let p = pipeline(
            "animations:\n  - name: walk\n    frames: [a.png, /abs/b.png]\nframes: [c.png]\n",
        );
        assert_eq!(
            p.input_paths(),
            vec![
                PathBuf::from("/project/a.png"),
                PathBuf::from("/abs/b.png"),
                PathBuf::from("/project/c.png"),
            ]
        );
    }

    #[test]
    fn test_build_without_frames() {
        let p = pipeline("palette: gameboy\n");
        assert!(matches!(p.build(), Err(SheetError::NoFrames)));
    }

    #[test]
    fn test_unknown_palette_rejected() {
        let config = AppConfig::from_yaml("palette: nes\n").unwrap();
        let err = SheetPipeline::new(config, ".").err().unwrap();
        assert!(matches!(err, SheetError::Config(ConfigError::Pipeline(_))));
        assert!(err.to_string().contains("nes"));
    }
}
