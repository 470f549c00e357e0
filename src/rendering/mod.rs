pub mod metadata;
pub mod png_export;
pub mod webp_export;

pub use metadata::{AnimationMeta, FrameMeta, SheetMetadata, SheetSize};
pub use png_export::encode_png;
pub use webp_export::encode_webp;
