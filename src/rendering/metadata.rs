//! JSON description of a finished sheet for game engines.
//!
//! Positions are in sheet pixels, so they are multiplied by the export
//! scale. Animations are reported as contiguous frame-index ranges.

use chrono::{DateTime, Utc};
use pixelart::{LayoutResult, ProcessedFrame};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::{AnimationConfig, FrameSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetMetadata {
    /// File name of the sheet image, absent for metadata-only exports
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    pub size: SheetSize,
    pub scale: u32,
    pub frames: Vec<FrameMeta>,
    pub animations: Vec<AnimationMeta>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped: Vec<String>,
    pub generator: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMeta {
    pub index: usize,
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub animation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationMeta {
    pub name: String,
    pub from: usize,
    pub to: usize,
    pub fps: u32,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl SheetMetadata {
    /// Describe a laid-out sheet.
    ///
    /// `sources` is indexed by frame number; `animations` supplies per-name
    /// playback settings, falling back to 30 fps looping.
    pub fn build(
        layout: &LayoutResult,
        frames: &[ProcessedFrame],
        sources: &[FrameSource],
        animations: &[AnimationConfig],
        scale: u32,
    ) -> Self {
        let by_id: HashMap<&str, &ProcessedFrame> = frames.iter().map(|f| (f.id(), f)).collect();

        let frame_meta = layout
            .positions
            .iter()
            .filter_map(|pos| {
                let frame = by_id.get(pos.frame_id.as_str())?;
                Some(FrameMeta {
                    index: frame.frame_number(),
                    id: pos.frame_id.clone(),
                    x: pos.x * scale,
                    y: pos.y * scale,
                    width: pos.width * scale,
                    height: pos.height * scale,
                    animation: frame.animation().map(str::to_string),
                    source: sources
                        .get(frame.frame_number())
                        .map(|s| s.path.display().to_string()),
                })
            })
            .collect();

        Self {
            image: None,
            size: SheetSize {
                width: layout.total_size.width * scale,
                height: layout.total_size.height * scale,
            },
            scale,
            frames: frame_meta,
            animations: animation_ranges(layout, frames, animations),
            skipped: layout.skipped.clone(),
            generator: concat!("pixelsheet ", env!("CARGO_PKG_VERSION")).to_string(),
            generated_at: Utc::now(),
        }
    }

    pub fn with_image(mut self, name: impl Into<String>) -> Self {
        self.image = Some(name.into());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Group consecutive placed frames sharing an animation name into ranges.
///
/// Frames without a position are not on the sheet, so a skipped frame ends
/// the run it falls in.
fn animation_ranges(
    layout: &LayoutResult,
    frames: &[ProcessedFrame],
    config: &[AnimationConfig],
) -> Vec<AnimationMeta> {
    let placed: HashSet<&str> = layout.positions.iter().map(|p| p.frame_id.as_str()).collect();
    let mut ordered: Vec<&ProcessedFrame> =
        frames.iter().filter(|f| placed.contains(f.id())).collect();
    ordered.sort_by_key(|f| f.frame_number());

    let mut ranges: Vec<AnimationMeta> = Vec::new();
    for frame in ordered {
        let Some(name) = frame.animation() else {
            continue;
        };
        let n = frame.frame_number();
        if let Some(last) = ranges.last_mut() {
            if last.name == name && last.to + 1 == n {
                last.to = n;
                continue;
            }
        }
        let settings = config.iter().find(|a| a.name == name);
        ranges.push(AnimationMeta {
            name: name.to_string(),
            from: n,
            to: n,
            fps: settings.map_or(30, |a| a.fps),
            looping: settings.map_or(true, |a| a.looping),
        });
    }
    ranges
}
