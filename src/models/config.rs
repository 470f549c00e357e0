use pixelart::{
    Color, ColorPalette, Direction, LayoutDescriptor, LayoutKind, PixelSettings, Registry, Size,
    SortOrder,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Sheet configuration loaded from pixelsheet.yaml
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Processing algorithm name
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Palette id (preset or custom); no palette disables quantization
    #[serde(default)]
    pub palette: Option<String>,

    /// Custom palettes registered next to the presets
    #[serde(default)]
    pub palettes: Vec<PaletteConfig>,

    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    /// Named frame sequences, in sheet order
    #[serde(default)]
    pub animations: Vec<AnimationConfig>,

    /// Frames that belong to no animation, placed after the animations
    #[serde(default)]
    pub frames: Vec<PathBuf>,

    #[serde(default)]
    pub export: ExportConfig,
}

fn default_algorithm() -> String {
    "professional".to_string()
}

/// A custom palette declared in configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PaletteConfig {
    pub id: String,

    /// Display name (defaults to the id)
    #[serde(default)]
    pub name: Option<String>,

    /// Hex colors, `#rgb`, `#rrggbb` or `#rrggbbaa`
    pub colors: Vec<String>,
}

/// Per-frame processing settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SettingsConfig {
    #[serde(default = "default_target")]
    pub width: u32,

    #[serde(default = "default_target")]
    pub height: u32,

    #[serde(default = "default_scale")]
    pub pixel_scale: u32,

    #[serde(default)]
    pub dithering: bool,

    #[serde(default = "default_dither_strength")]
    pub dither_strength: f32,

    #[serde(default)]
    pub contrast_boost: f32,

    #[serde(default)]
    pub brightness_adjust: i32,
}

fn default_target() -> u32 {
    32
}

fn default_scale() -> u32 {
    1
}

fn default_dither_strength() -> f32 {
    0.5
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            width: default_target(),
            height: default_target(),
            pixel_scale: default_scale(),
            dithering: false,
            dither_strength: default_dither_strength(),
            contrast_boost: 0.0,
            brightness_adjust: 0,
        }
    }
}

/// Sheet layout options; fields that do not apply to `type` are ignored
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LayoutConfig {
    /// grid, linear or packed
    #[serde(rename = "type", default = "default_layout")]
    pub kind: String,

    #[serde(default)]
    pub columns: Option<u32>,

    #[serde(default)]
    pub rows: Option<u32>,

    #[serde(default)]
    pub spacing: u32,

    #[serde(default)]
    pub padding: u32,

    /// Linear only: horizontal or vertical
    #[serde(default = "default_direction")]
    pub direction: String,

    /// Packed only: none, area, height or width
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Packed only: enlarge the bin when frames do not fit
    #[serde(default)]
    pub grow: Option<bool>,

    #[serde(default)]
    pub max_width: Option<u32>,

    #[serde(default)]
    pub max_height: Option<u32>,
}

fn default_layout() -> String {
    "packed".to_string()
}

fn default_direction() -> String {
    "horizontal".to_string()
}

fn default_sort() -> String {
    "area".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            kind: default_layout(),
            columns: None,
            rows: None,
            spacing: 0,
            padding: 0,
            direction: default_direction(),
            sort: default_sort(),
            grow: None,
            max_width: None,
            max_height: None,
        }
    }
}

/// A named animation and its frame files
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnimationConfig {
    pub name: String,

    pub frames: Vec<PathBuf>,

    #[serde(default = "default_fps")]
    pub fps: u32,

    #[serde(rename = "loop", default = "default_loop")]
    pub looping: bool,
}

fn default_fps() -> u32 {
    30
}

fn default_loop() -> bool {
    true
}

/// Output encoding
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Webp,
    /// Metadata only, no image
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Webp => "webp",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,

    /// Output path, relative to the configuration file
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Write a JSON sidecar next to image output
    #[serde(default = "default_metadata")]
    pub metadata: bool,

    /// Re-compress PNG output with oxipng
    #[serde(default)]
    pub optimize: bool,

    /// Sheet background as hex; transparent when unset
    #[serde(default)]
    pub background: Option<String>,
}

fn default_output() -> PathBuf {
    PathBuf::from("sheet.png")
}

fn default_metadata() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            output: default_output(),
            metadata: default_metadata(),
            optimize: false,
            background: None,
        }
    }
}

/// One input frame and the animation it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSource {
    pub path: PathBuf,
    pub animation: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            palette: None,
            palettes: Vec::new(),
            settings: SettingsConfig::default(),
            layout: LayoutConfig::default(),
            animations: Vec::new(),
            frames: Vec::new(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.display(),
            animations = config.animations.len(),
            frames = config.frame_sources().len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Preset palettes plus every custom palette from `palettes`
    pub fn build_registry(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::with_presets();
        for p in &self.palettes {
            let name = p.name.clone().unwrap_or_else(|| p.id.clone());
            let hex: Vec<&str> = p.colors.iter().map(String::as_str).collect();
            registry.register_palette(ColorPalette::from_hex(&p.id, name, &hex)?)?;
        }
        Ok(registry)
    }

    /// Processing settings with the palette resolved through `registry`
    pub fn pixel_settings(&self, registry: &Registry) -> Result<PixelSettings, ConfigError> {
        let s = &self.settings;
        let mut settings = PixelSettings::new(s.width, s.height)
            .pixel_scale(s.pixel_scale)
            .dithering(s.dithering)
            .dither_strength(s.dither_strength)
            .contrast_boost(s.contrast_boost)
            .brightness_adjust(s.brightness_adjust);
        if let Some(id) = &self.palette {
            settings = settings.palette(registry.palette(id)?.clone());
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn layout_descriptor(&self) -> Result<LayoutDescriptor, ConfigError> {
        let l = &self.layout;
        Ok(LayoutDescriptor {
            kind: l.kind.parse::<LayoutKind>()?,
            columns: l.columns,
            rows: l.rows,
            spacing: l.spacing,
            padding: l.padding,
            direction: l.direction.parse::<Direction>()?,
            sort: l.sort.parse::<SortOrder>()?,
            grow: l.grow,
        })
    }

    /// Sheet size limit; an unset side is unbounded
    pub fn max_size(&self) -> Option<Size> {
        match (self.layout.max_width, self.layout.max_height) {
            (None, None) => None,
            (w, h) => Some(Size::new(w.unwrap_or(u32::MAX), h.unwrap_or(u32::MAX))),
        }
    }

    pub fn background(&self) -> Result<Option<Color>, ConfigError> {
        self.export
            .background
            .as_deref()
            .map(|hex| {
                Color::from_hex(hex)
                    .map_err(|e| ConfigError::Invalid(format!("background {hex:?}: {e}")))
            })
            .transpose()
    }

    /// Every input frame in sheet order: animations first, then loose frames
    pub fn frame_sources(&self) -> Vec<FrameSource> {
        let animated = self.animations.iter().flat_map(|a| {
            a.frames.iter().map(|path| FrameSource {
                path: path.clone(),
                animation: Some(a.name.clone()),
            })
        });
        let loose = self.frames.iter().map(|path| FrameSource {
            path: path.clone(),
            animation: None,
        });
        animated.chain(loose).collect()
    }

    pub fn animation(&self, name: &str) -> Option<&AnimationConfig> {
        self.animations.iter().find(|a| a.name == name)
    }

    /// Check every name and value without touching the filesystem
    pub fn validate(&self) -> Result<(), ConfigError> {
        let registry = self.build_registry()?;
        registry.algorithm(&self.algorithm)?;
        self.pixel_settings(&registry)?;
        self.layout_descriptor()?;
        self.background()?;

        let mut names = std::collections::HashSet::new();
        for a in &self.animations {
            if !names.insert(a.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate animation name: {}",
                    a.name
                )));
            }
            if a.fps == 0 {
                return Err(ConfigError::Invalid(format!(
                    "animation {} must have fps >= 1",
                    a.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelart::{AlgorithmKind, Layout, PipelineError};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.algorithm, "professional");
        assert_eq!(config.palette, None);
        assert_eq!(config.settings.width, 32);
        assert_eq!(config.settings.dither_strength, 0.5);
        assert_eq!(config.layout.kind, "packed");
        assert_eq!(config.export.format, ExportFormat::Png);
        assert!(config.export.metadata);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r##"
algorithm: bilinear
palette: mine
palettes:
  - id: mine
    name: Mine
    colors: ["#000", "#ffffff", "#ff000080"]
settings:
  width: 24
  height: 16
  dithering: true
layout:
  type: grid
  columns: 4
  spacing: 2
  padding: 1
animations:
  - name: walk
    frames: [walk_0.png, walk_1.png]
    fps: 12
  - name: idle
    frames: [idle_0.png]
    loop: false
frames: [icon.png]
export:
  format: webp
  output: out/hero.webp
  background: "#102030"
"##;

        let config = AppConfig::from_yaml(yaml).unwrap();
        config.validate().unwrap();

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.palette("mine").unwrap().len(), 3);
        assert_eq!(registry.algorithm(&config.algorithm).unwrap().kind(), AlgorithmKind::Bilinear);

        let settings = config.pixel_settings(&registry).unwrap();
        assert_eq!(settings.target_size, Size::new(24, 16));
        assert!(settings.wants_dither());

        let layout = config.layout_descriptor().unwrap().build();
        assert_eq!(layout.kind(), LayoutKind::Grid);
        let Layout::Grid(grid) = layout else {
            panic!("expected grid layout");
        };
        assert_eq!(grid.columns, Some(4));

        assert_eq!(config.export.format, ExportFormat::Webp);
        assert_eq!(config.background().unwrap(), Some(Color::rgb(0x10, 0x20, 0x30)));
        assert_eq!(config.animation("walk").unwrap().fps, 12);
        assert!(!config.animation("idle").unwrap().looping);
        assert!(config.animation("idle").unwrap().fps == 30);
    }

    #[test]
    fn test_frame_sources_order() {
        let config = AppConfig {
            animations: vec![AnimationConfig {
                name: "walk".to_string(),
                frames: vec![PathBuf::from("a.png"), PathBuf::from("b.png")],
                fps: 30,
                looping: true,
            }],
            frames: vec![PathBuf::from("c.png")],
            ..Default::default()
        };

        let sources = config.frame_sources();
        let names: Vec<_> = sources.iter().map(|s| s.path.to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        assert_eq!(sources[1].animation.as_deref(), Some("walk"));
        assert_eq!(sources[2].animation, None);
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let config = AppConfig {
            algorithm: "sharp".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Pipeline(PipelineError::UnknownAlgorithm(ref name)) if name == "sharp"
        ));

        let config = AppConfig {
            palette: Some("nes".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().to_string(), "unknown palette: nes");

        let mut config = AppConfig::default();
        config.layout.kind = "spiral".to_string();
        assert_eq!(config.validate().unwrap_err().to_string(), "unknown layout type: spiral");
    }

    #[test]
    fn test_duplicate_custom_palette_rejected() {
        let palette = PaletteConfig {
            id: "gameboy".to_string(),
            name: None,
            colors: vec!["#000000".to_string()],
        };
        let config = AppConfig {
            palettes: vec![palette],
            ..Default::default()
        };
        assert!(config.build_registry().is_err());
    }

    #[test]
    fn test_bad_background_rejected() {
        let mut config = AppConfig::default();
        config.export.background = Some("#12".to_string());
        assert!(matches!(config.background(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_out_of_range_settings_rejected() {
        let mut config = AppConfig::default();
        config.settings.contrast_boost = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_size() {
        let mut config = AppConfig::default();
        assert_eq!(config.max_size(), None);
        config.layout.max_width = Some(256);
        assert_eq!(config.max_size(), Some(Size::new(256, u32::MAX)));
    }
}
