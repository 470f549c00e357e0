//! Embedded starter assets
//!
//! The default `pixelsheet.yaml` is compiled into the binary so `init` can
//! write it without any files next to the executable.

use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "pixelsheet.yaml";

/// Embedded default config
#[derive(RustEmbed)]
#[folder = "."]
#[include = "pixelsheet.yaml"]
struct EmbeddedConfig;

/// Report of init (extraction) operations
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

/// Raw bytes of the embedded default config
pub fn default_config() -> io::Result<Cow<'static, [u8]>> {
    EmbeddedConfig::get(DEFAULT_CONFIG_NAME)
        .map(|f| f.data)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("Embedded {DEFAULT_CONFIG_NAME} not found"),
            )
        })
}

/// Embedded default config as a UTF-8 string
pub fn default_config_string() -> io::Result<String> {
    let bytes = default_config()?;
    String::from_utf8(bytes.into_owned()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write the default config to `path` (init command).
///
/// An existing file is left alone unless `force` is set.
pub fn init(path: &Path, force: bool) -> io::Result<InitReport> {
    let mut report = InitReport::default();

    if !force && path.exists() {
        report.skipped.push(path.display().to_string());
        return Ok(report);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &*default_config()?)?;
    tracing::info!(path = %path.display(), "Wrote default config");
    report.written.push(path.display().to_string());

    Ok(report)
}

/// Names of every embedded asset (for display)
pub fn list_embedded() -> Vec<String> {
    EmbeddedConfig::iter().map(|s| s.to_string()).collect()
}
