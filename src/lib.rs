//! Pixelsheet - pixel-art sprite sheets from rendered frames
//!
//! The processing, layout and assembly live in the `pixelart` crate. This
//! crate adds configuration, frame loading, export and the watch service,
//! and exposes them for integration testing.

pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
