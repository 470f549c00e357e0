pub mod config;

pub use config::{
    AnimationConfig, AppConfig, ExportConfig, ExportFormat, FrameSource, LayoutConfig,
    PaletteConfig, SettingsConfig,
};
