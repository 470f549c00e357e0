use std::fmt;
use std::str::FromStr;

use super::{ensure_frames, FramePosition, FrameRect, LayoutEngine, LayoutResult};
use crate::error::{PipelineError, Result};
use crate::image::Size;

/// Seed side = `ceil(sqrt(total padded area) · SEED_SLACK)`.
const SEED_SLACK: f64 = 1.2;
/// Seed growth factor between packing attempts.
const GROWTH: f64 = 1.25;
const MAX_ATTEMPTS: usize = 16;

/// Order in which frames are offered to the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Input order.
    None,
    #[default]
    Area,
    Height,
    Width,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::None => "none",
            SortOrder::Area => "area",
            SortOrder::Height => "height",
            SortOrder::Width => "width",
        })
    }
}

impl FromStr for SortOrder {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SortOrder::None),
            "area" => Ok(SortOrder::Area),
            "height" => Ok(SortOrder::Height),
            "width" => Ok(SortOrder::Width),
            _ => Err(PipelineError::InvalidSettings(format!(
                "unknown sort order: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Rect {
    fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.w <= self.x + self.w
            && other.y + other.h <= self.y + self.h
    }
}

/// Free-rectangle bin packing.
///
/// Each frame occupies `(width + spacing) × (height + spacing)` inside a
/// square bin. A frame goes into the free rectangle that leaves the smallest
/// leftover on its shorter side; that rectangle is then split into a right
/// and a bottom remainder. Frames that fit nowhere are reported in
/// [`LayoutResult::skipped`].
///
/// With `grow` set, a run that skips frames is retried with a 25% larger bin
/// until everything fits or the bin reaches `max_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedLayout {
    pub sort: SortOrder,
    pub spacing: u32,
    pub padding: u32,
    pub grow: bool,
}

impl Default for PackedLayout {
    fn default() -> Self {
        Self {
            sort: SortOrder::Area,
            spacing: 0,
            padding: 0,
            grow: true,
        }
    }
}

struct Packing {
    /// Top-left offset inside the bin, by input index.
    placed: Vec<Option<(u32, u32)>>,
    skipped: usize,
}

impl PackedLayout {
    pub fn new(spacing: u32, padding: u32) -> Self {
        Self {
            spacing,
            padding,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn grow(mut self, grow: bool) -> Self {
        self.grow = grow;
        self
    }

    fn padded(&self, f: &FrameRect) -> (u32, u32) {
        (
            f.width.saturating_add(self.spacing),
            f.height.saturating_add(self.spacing),
        )
    }

    /// Indices of `frames` in packing order. The sort is stable.
    fn order(&self, frames: &[FrameRect]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..frames.len()).collect();
        let key = |i: &usize| {
            let f = &frames[*i];
            match self.sort {
                SortOrder::None => 0,
                SortOrder::Area => f.width as u64 * f.height as u64,
                SortOrder::Height => f.height as u64,
                SortOrder::Width => f.width as u64,
            }
        };
        if self.sort != SortOrder::None {
            order.sort_by_key(|i| std::cmp::Reverse(key(i)));
        }
        order
    }

    fn seed_side(&self, frames: &[FrameRect]) -> u32 {
        let area: u64 = frames
            .iter()
            .map(|f| {
                let (w, h) = self.padded(f);
                w as u64 * h as u64
            })
            .fold(0u64, u64::saturating_add);
        let largest = frames
            .iter()
            .map(|f| {
                let (w, h) = self.padded(f);
                w.max(h)
            })
            .max()
            .unwrap_or(1);
        let side = ((area as f64).sqrt() * SEED_SLACK).ceil() as u32;
        side.max(largest)
    }

    fn pack(&self, frames: &[FrameRect], order: &[usize], bin: (u32, u32)) -> Packing {
        let mut free = vec![Rect {
            x: 0,
            y: 0,
            w: bin.0,
            h: bin.1,
        }];
        let mut placed = vec![None; frames.len()];
        let mut skipped = 0;

        for &i in order {
            let (fw, fh) = self.padded(&frames[i]);

            let best = free
                .iter()
                .enumerate()
                .filter(|(_, r)| r.w >= fw && r.h >= fh)
                .min_by_key(|(_, r)| (r.w - fw).min(r.h - fh))
                .map(|(idx, _)| idx);

            let Some(idx) = best else {
                skipped += 1;
                continue;
            };

            let r = free.swap_remove(idx);
            placed[i] = Some((r.x, r.y));

            let right = Rect {
                x: r.x + fw,
                y: r.y,
                w: r.w - fw,
                h: fh,
            };
            let bottom = Rect {
                x: r.x,
                y: r.y + fh,
                w: r.w,
                h: r.h - fh,
            };
            free.extend([right, bottom].into_iter().filter(|s| s.w > 0 && s.h > 0));
            prune(&mut free);
        }

        Packing { placed, skipped }
    }
}

/// Drop free rectangles fully contained in another one.
fn prune(free: &mut Vec<Rect>) {
    let mut i = 0;
    while i < free.len() {
        let contained = free
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.contains(&free[i]) && (other != &free[i] || j < i));
        if contained {
            free.remove(i);
        } else {
            i += 1;
        }
    }
}

impl LayoutEngine for PackedLayout {
    fn calculate(&self, frames: &[FrameRect], max_size: Option<Size>) -> Result<LayoutResult> {
        ensure_frames(frames)?;

        // The bin holds padded frames, so the trailing spacing of the last
        // column/row may reach into the padding.
        let cap = max_size.map(|m| {
            (
                m.width
                    .saturating_add(self.spacing)
                    .saturating_sub(self.padding.saturating_mul(2)),
                m.height
                    .saturating_add(self.spacing)
                    .saturating_sub(self.padding.saturating_mul(2)),
            )
        });
        let clamp = |side: u32| match cap {
            Some((cw, ch)) => (side.min(cw), side.min(ch)),
            None => (side, side),
        };

        let order = self.order(frames);
        let mut side = self.seed_side(frames);
        let mut bin = clamp(side);
        let mut packing = self.pack(frames, &order, bin);

        let mut attempts = 1;
        while self.grow && packing.skipped > 0 && attempts < MAX_ATTEMPTS {
            side = ((side as f64) * GROWTH).ceil() as u32;
            let next = clamp(side);
            if next == bin {
                break;
            }
            bin = next;
            packing = self.pack(frames, &order, bin);
            attempts += 1;
        }

        let mut positions = Vec::with_capacity(frames.len());
        let mut skipped = Vec::new();
        for (f, slot) in frames.iter().zip(&packing.placed) {
            match slot {
                Some((x, y)) => positions.push(FramePosition {
                    frame_id: f.id.clone(),
                    x: self.padding.saturating_add(*x),
                    y: self.padding.saturating_add(*y),
                    width: f.width,
                    height: f.height,
                }),
                None => skipped.push(f.id.clone()),
            }
        }

        if !skipped.is_empty() {
            tracing::warn!(
                skipped = skipped.len(),
                bin_width = bin.0,
                bin_height = bin.1,
                "frames did not fit in packed layout"
            );
        }

        let width = positions.iter().map(|p| p.right()).max().unwrap_or(self.padding);
        let height = positions.iter().map(|p| p.bottom()).max().unwrap_or(self.padding);

        Ok(LayoutResult {
            positions,
            total_size: Size::new(
                width.saturating_add(self.padding),
                height.saturating_add(self.padding),
            ),
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{assert_well_formed, random_frames, uniform};

    #[test]
    fn test_five_equal_frames() {
        let result = PackedLayout::new(2, 4)
            .calculate(&uniform(5, 64, 64), None)
            .unwrap();

        assert!(result.skipped.is_empty());
        assert_eq!(result.positions.len(), 5);
        assert_well_formed(&result, 4);

        let coords: Vec<_> = result.positions.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(4, 4), (70, 4), (136, 4), (4, 70), (70, 70)]);
        assert_eq!(result.total_size, Size::new(204, 138));
        // Five spaced cells (64 + 2) are the floor; a 3×3 grid of 64² is not.
        assert!(result.total_size.area() >= 5 * 66 * 66);
        assert!(result.total_size.area() < 9 * 64 * 64);
    }

    #[test]
    fn test_without_grow_skips() {
        // The 1.2 seed (178) only holds a 2×2 block of 66-pixel cells.
        let result = PackedLayout::new(2, 4)
            .grow(false)
            .calculate(&uniform(5, 64, 64), None)
            .unwrap();
        assert_eq!(result.positions.len(), 4);
        assert_eq!(result.skipped, vec!["f4".to_string()]);
        assert_well_formed(&result, 4);
    }

    #[test]
    fn test_max_size_caps_bin() {
        let result = PackedLayout::new(0, 0)
            .calculate(&uniform(6, 10, 10), Some(Size::new(20, 20)))
            .unwrap();
        assert_eq!(result.positions.len(), 4);
        assert_eq!(result.skipped.len(), 2);
        assert!(result.total_size.fits_within(Size::new(20, 20)));
    }

    #[test]
    fn test_extreme_spacing_saturates() {
        let layout = PackedLayout::new(u32::MAX, u32::MAX);

        let result = layout.calculate(&uniform(3, 8, 8), None).unwrap();
        assert_eq!(result.positions.len() + result.skipped.len(), 3);
        assert_eq!(result.total_size, Size::new(u32::MAX, u32::MAX));

        let capped = layout
            .calculate(&uniform(3, 8, 8), Some(Size::new(64, 64)))
            .unwrap();
        assert!(capped.positions.is_empty());
        assert_eq!(capped.skipped.len(), 3);
    }

    #[test]
    fn test_oversized_frame_skipped() {
        let frames = vec![FrameRect::new("big", 50, 50), FrameRect::new("small", 5, 5)];
        let result = PackedLayout::new(1, 1)
            .calculate(&frames, Some(Size::new(30, 30)))
            .unwrap();
        assert_eq!(result.skipped, vec!["big".to_string()]);
        assert_eq!(result.positions[0].frame_id, "small");
    }

    #[test]
    fn test_positions_in_input_order() {
        let frames = vec![
            FrameRect::new("small", 4, 4),
            FrameRect::new("large", 20, 20),
            FrameRect::new("mid", 10, 10),
        ];
        let result = PackedLayout::new(0, 0).calculate(&frames, None).unwrap();
        let ids: Vec<_> = result.positions.iter().map(|p| p.frame_id.as_str()).collect();
        assert_eq!(ids, vec!["small", "large", "mid"]);
        // Area sort places the largest frame first, in the corner.
        assert_eq!((result.positions[1].x, result.positions[1].y), (0, 0));
    }

    #[test]
    fn test_stable_sort() {
        let layout = PackedLayout::default().sort(SortOrder::Height);
        let frames = vec![
            FrameRect::new("a", 5, 10),
            FrameRect::new("b", 9, 10),
            FrameRect::new("c", 5, 12),
        ];
        assert_eq!(layout.order(&frames), vec![2, 0, 1]);
        assert_eq!(layout.sort(SortOrder::None).order(&frames), vec![0, 1, 2]);
    }

    #[test]
    fn test_prune_removes_contained() {
        let mut free = vec![
            Rect { x: 0, y: 0, w: 10, h: 10 },
            Rect { x: 2, y: 2, w: 3, h: 3 },
            Rect { x: 0, y: 0, w: 10, h: 10 },
            Rect { x: 20, y: 0, w: 4, h: 4 },
        ];
        prune(&mut free);
        assert_eq!(
            free,
            vec![Rect { x: 0, y: 0, w: 10, h: 10 }, Rect { x: 20, y: 0, w: 4, h: 4 }]
        );
    }

    #[test]
    fn test_random_frames_never_overlap() {
        for seed in 0..40 {
            let frames = random_frames(seed, 25, 48);
            for sort in [SortOrder::None, SortOrder::Area, SortOrder::Height, SortOrder::Width] {
                let result = PackedLayout::new(2, 3)
                    .sort(sort)
                    .calculate(&frames, None)
                    .unwrap();
                assert!(result.skipped.is_empty(), "seed {seed} {sort}");
                assert_well_formed(&result, 3);
            }
        }
    }

    #[test]
    fn test_random_frames_respect_max_size() {
        let max = Size::new(120, 100);
        for seed in 0..20 {
            let frames = random_frames(seed, 30, 40);
            let result = PackedLayout::new(1, 2)
                .calculate(&frames, Some(max))
                .unwrap();
            assert!(result.total_size.fits_within(max), "seed {seed}");
            assert_eq!(result.positions.len() + result.skipped.len(), frames.len());
            assert_well_formed(&result, 2);
        }
    }
}
