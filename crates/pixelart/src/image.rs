//! Raster image and color types.
//!
//! [`RasterImage`] is the unit every processing step consumes and produces:
//! a row-major RGBA8 buffer whose length is always `width * height * 4`.
//! Steps never write into their input; each one allocates a fresh image.

use std::str::FromStr;

use crate::error::{ColorParseError, PipelineError, Result};

/// An RGBA color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Create an opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    ///
    /// # Example
    ///
    /// ```
    /// use pixelart::Color;
    ///
    /// assert_eq!(Color::from_hex("#0f380f").unwrap(), Color::rgb(15, 56, 15));
    /// assert_eq!(Color::from_hex("fff").unwrap(), Color::rgb(255, 255, 255));
    /// ```
    pub fn from_hex(hex: &str) -> std::result::Result<Self, ColorParseError> {
        let hex = hex.trim().trim_start_matches('#');
        // Digits only; no sign, whitespace or non-ASCII inside the value
        let digits = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8).ok_or(ColorParseError::InvalidHex(c)))
            .collect::<std::result::Result<Vec<u8>, _>>()?;
        let byte = |i: usize| digits[i] * 16 + digits[i + 1];

        match digits.len() {
            3 => Ok(Self::rgb(digits[0] * 17, digits[1] * 17, digits[2] * 17)),
            6 => Ok(Self::rgb(byte(0), byte(2), byte(4))),
            8 => Ok(Self::rgba(byte(0), byte(2), byte(4), byte(6))),
            _ => Err(ColorParseError::InvalidLength),
        }
    }

    /// Format as lowercase `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Squared Euclidean distance over R, G, B to a floating point color.
    ///
    /// Squared distance orders candidates exactly like `sqrt(dr² + dg² + db²)`.
    #[inline]
    pub fn distance_sq(&self, rgb: [f32; 3]) -> f32 {
        let dr = rgb[0] - self.r as f32;
        let dg = rgb[1] - self.g as f32;
        let db = rgb[2] - self.b as f32;
        dr * dr + dg * dg + db * db
    }
}

impl From<[u8; 4]> for Color {
    fn from(px: [u8; 4]) -> Self {
        Self::rgba(px[0], px[1], px[2], px[3])
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are less than or equal to `other`'s.
    #[inline]
    pub fn fits_within(&self, other: Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A rectangular RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wrap an existing RGBA buffer.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidDimensions`] if either dimension is zero
    /// - [`PipelineError::BufferLength`] if `data.len() != width * height * 4`
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(PipelineError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create an image filled with a single color.
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }
        let px = color.to_array();
        let data = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y).to_array());
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Raw RGBA bytes, row-major.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub(crate) fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width as usize + x) * 4
    }

    /// Read pixel `(x, y)` as `[r, g, b, a]`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x as usize, y as usize);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub(crate) fn set_pixel(&mut self, x: usize, y: usize, px: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Iterate pixels as `[r, g, b, a]` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]])
    }

    /// Magnify by an integer factor with nearest-neighbor sampling.
    ///
    /// Every source pixel becomes a `factor × factor` block, so pixel edges
    /// stay crisp.
    pub fn scale_nearest(&self, factor: u32) -> Result<RasterImage> {
        if factor == 0 {
            return Err(PipelineError::InvalidSettings(
                "scale factor must be at least 1".into(),
            ));
        }
        if factor == 1 {
            return Ok(self.clone());
        }

        let out_w = self.width as usize * factor as usize;
        let out_h = self.height as usize * factor as usize;
        let mut data = Vec::with_capacity(out_w * out_h * 4);
        let src_row_bytes = self.width as usize * 4;

        for y in 0..self.height as usize {
            let row = &self.data[y * src_row_bytes..(y + 1) * src_row_bytes];
            let start = data.len();
            for px in row.chunks_exact(4) {
                for _ in 0..factor {
                    data.extend_from_slice(px);
                }
            }
            for _ in 1..factor {
                data.extend_from_within(start..start + out_w * 4);
            }
        }

        RasterImage::new(out_w as u32, out_h as u32, data)
    }
}

/// Round and clamp a floating point channel value into `0..=255`.
#[inline]
pub(crate) fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
