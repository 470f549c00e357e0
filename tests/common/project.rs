//! Scratch project directory for end-to-end builds.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use pixelsheet::services::SheetPipeline;

use super::fixtures::{png_bytes, rendered_frame};

/// A temporary directory holding frames and a pixelsheet.yaml
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a 64×64 rendered frame at `relative`
    pub fn frame(&self, relative: &str, tint: [u8; 3]) -> &Self {
        self.frame_sized(relative, 64, 64, tint)
    }

    pub fn frame_sized(&self, relative: &str, width: u32, height: u32, tint: [u8; 3]) -> &Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, png_bytes(&rendered_frame(width, height, tint))).unwrap();
        self
    }

    /// Write pixelsheet.yaml and return its path
    pub fn config(&self, yaml: &str) -> PathBuf {
        let path = self.path("pixelsheet.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }

    /// Write the config and set up a pipeline from it
    pub fn pipeline(&self, yaml: &str) -> SheetPipeline {
        SheetPipeline::from_file(&self.config(yaml)).expect("pipeline setup failed")
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        fs::read(self.path(relative)).unwrap()
    }

    pub fn read_json(&self, relative: &str) -> serde_json::Value {
        serde_json::from_slice(&self.read(relative)).unwrap()
    }
}
