//! Built-in retro palettes.
//!
//! The table is constant for the lifetime of the process. A
//! [`Registry`](crate::Registry) copies the entries it wants into owned
//! [`ColorPalette`]s at startup.

use super::ColorPalette;
use crate::image::Color;

/// A static palette definition.
#[derive(Debug, Clone, Copy)]
pub struct PresetPalette {
    pub id: &'static str,
    pub name: &'static str,
    pub colors: &'static [Color],
    pub max_colors: usize,
}

impl PresetPalette {
    /// Materialize this preset as an owned palette.
    pub fn to_palette(&self) -> ColorPalette {
        // Presets are non-empty with non-blank ids, checked by test_presets_are_valid
        ColorPalette::with_max_colors(self.id, self.name, self.colors.to_vec(), self.max_colors)
            .unwrap_or_else(|e| unreachable!("invalid preset palette {}: {e}", self.id))
    }
}

/// Original Game Boy DMG greens.
pub const GAMEBOY: [Color; 4] = [
    Color::rgb(0x0f, 0x38, 0x0f),
    Color::rgb(0x30, 0x62, 0x30),
    Color::rgb(0x8b, 0xac, 0x0f),
    Color::rgb(0x9b, 0xbc, 0x0f),
];

/// CGA mode 4, palette 1 (high intensity).
pub const CGA: [Color; 4] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0x55, 0xff, 0xff),
    Color::rgb(0xff, 0x55, 0xff),
    Color::rgb(0xff, 0xff, 0xff),
];

pub const GRAYSCALE_4: [Color; 4] = [
    Color::rgb(0, 0, 0),
    Color::rgb(85, 85, 85),
    Color::rgb(170, 170, 170),
    Color::rgb(255, 255, 255),
];

pub const PICO8: [Color; 16] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0x1d, 0x2b, 0x53),
    Color::rgb(0x7e, 0x25, 0x53),
    Color::rgb(0x00, 0x87, 0x51),
    Color::rgb(0xab, 0x52, 0x36),
    Color::rgb(0x5f, 0x57, 0x4f),
    Color::rgb(0xc2, 0xc3, 0xc7),
    Color::rgb(0xff, 0xf1, 0xe8),
    Color::rgb(0xff, 0x00, 0x4d),
    Color::rgb(0xff, 0xa3, 0x00),
    Color::rgb(0xff, 0xec, 0x27),
    Color::rgb(0x00, 0xe4, 0x36),
    Color::rgb(0x29, 0xad, 0xff),
    Color::rgb(0x83, 0x76, 0x9c),
    Color::rgb(0xff, 0x77, 0xa8),
    Color::rgb(0xff, 0xcc, 0xaa),
];

pub const EGA: [Color; 16] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0x00, 0x00, 0xaa),
    Color::rgb(0x00, 0xaa, 0x00),
    Color::rgb(0x00, 0xaa, 0xaa),
    Color::rgb(0xaa, 0x00, 0x00),
    Color::rgb(0xaa, 0x00, 0xaa),
    Color::rgb(0xaa, 0x55, 0x00),
    Color::rgb(0xaa, 0xaa, 0xaa),
    Color::rgb(0x55, 0x55, 0x55),
    Color::rgb(0x55, 0x55, 0xff),
    Color::rgb(0x55, 0xff, 0x55),
    Color::rgb(0x55, 0xff, 0xff),
    Color::rgb(0xff, 0x55, 0x55),
    Color::rgb(0xff, 0x55, 0xff),
    Color::rgb(0xff, 0xff, 0x55),
    Color::rgb(0xff, 0xff, 0xff),
];

/// 4 levels per channel (0, 85, 170, 255), red-major.
pub const RGB_CUBE_64: [Color; 64] = rgb_cube();

const fn rgb_cube() -> [Color; 64] {
    const LEVELS: [u8; 4] = [0, 85, 170, 255];
    let mut out = [Color::rgb(0, 0, 0); 64];
    let mut i = 0;
    while i < 64 {
        out[i] = Color::rgb(LEVELS[i / 16], LEVELS[(i / 4) % 4], LEVELS[i % 4]);
        i += 1;
    }
    out
}

/// All built-in palettes in registration order.
pub const PRESETS: &[PresetPalette] = &[
    PresetPalette {
        id: "gameboy",
        name: "Game Boy",
        colors: &GAMEBOY,
        max_colors: 4,
    },
    PresetPalette {
        id: "cga",
        name: "CGA",
        colors: &CGA,
        max_colors: 4,
    },
    PresetPalette {
        id: "grayscale4",
        name: "Grayscale (4)",
        colors: &GRAYSCALE_4,
        max_colors: 4,
    },
    PresetPalette {
        id: "pico8",
        name: "PICO-8",
        colors: &PICO8,
        max_colors: 16,
    },
    PresetPalette {
        id: "ega",
        name: "EGA",
        colors: &EGA,
        max_colors: 16,
    },
    PresetPalette {
        id: "rgb64",
        name: "RGB Cube (64)",
        colors: &RGB_CUBE_64,
        max_colors: 64,
    },
];

/// Look up a preset by id.
pub fn find(id: &str) -> Option<&'static PresetPalette> {
    PRESETS.iter().find(|p| p.id == id)
}
