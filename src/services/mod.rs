pub mod file_watcher;
pub mod frame_loader;
pub mod sheet_pipeline;

pub use file_watcher::{FileChangeEvent, FileWatcher, WatchFilter};
pub use frame_loader::{decode_png, load_frame, load_frames, FrameDecodeError};
pub use sheet_pipeline::{ExportReport, SheetBuild, SheetPipeline};
