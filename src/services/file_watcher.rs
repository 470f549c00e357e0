//! File watcher service for watch mode.
//!
//! Monitors the configuration directory for changes to frame PNGs and the
//! configuration itself, broadcasting debounced change events.

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Event sent when files change
#[derive(Debug, Clone)]
pub struct FileChangeEvent {
    /// Paths that changed
    pub paths: Vec<PathBuf>,
}

/// Decides which raw filesystem events trigger a rebuild
#[derive(Debug, Clone, Default)]
pub struct WatchFilter {
    extensions: Vec<String>,
    /// Files we write ourselves; changes to them must not retrigger a build
    ignored: HashSet<PathBuf>,
}

impl WatchFilter {
    pub fn new(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            ignored: HashSet::new(),
        }
    }

    /// Frame images and configuration files
    pub fn frames_and_config() -> Self {
        Self::new(&["png", "yaml", "yml"])
    }

    pub fn ignore(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.ignored.extend(paths);
        self
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.ignored.contains(path) {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// File watcher that monitors one directory tree
pub struct FileWatcher {
    /// Broadcast sender for file change events
    sender: broadcast::Sender<FileChangeEvent>,
    /// Handle to the watcher (kept alive)
    _watcher: Option<RecommendedWatcher>,
    /// Flag indicating if watcher is active
    active: bool,
}

impl FileWatcher {
    /// Create a new file watcher for the given directory.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(watch_path: &Path, filter: WatchFilter) -> Self {
        let (sender, _) = broadcast::channel(16);

        let (watcher, active) = if watch_path.exists() {
            match Self::start_watcher(watch_path, filter, sender.clone()) {
                Ok(watcher) => {
                    tracing::info!(path = %watch_path.display(), "File watcher started");
                    (Some(watcher), true)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to start file watcher");
                    (None, false)
                }
            }
        } else {
            tracing::warn!(path = %watch_path.display(), "Watch path does not exist");
            (None, false)
        };

        Self {
            sender,
            _watcher: watcher,
            active,
        }
    }

    fn start_watcher(
        path: &Path,
        filter: WatchFilter,
        sender: broadcast::Sender<FileChangeEvent>,
    ) -> Result<RecommendedWatcher, notify::Error> {
        // Create a channel for raw events
        let (tx, mut rx) = mpsc::channel::<PathBuf>(100);

        // Spawn debouncing task
        tokio::spawn(async move {
            let pending: Arc<Mutex<HashSet<PathBuf>>> = Arc::new(Mutex::new(HashSet::new()));
            let pending_clone = pending.clone();

            let debounce_sender = sender.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(DEBOUNCE).await;
                    let mut guard = pending_clone.lock().await;
                    if !guard.is_empty() {
                        let mut paths: Vec<PathBuf> = guard.drain().collect();
                        paths.sort();
                        tracing::debug!(paths = ?paths, "Files changed (debounced)");
                        let _ = debounce_sender.send(FileChangeEvent { paths });
                    }
                }
            });

            // Receive raw events and add to pending set
            while let Some(path) = rx.recv().await {
                pending.lock().await.insert(path);
            }
        });

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    if event.kind.is_access() {
                        return;
                    }
                    for path in event.paths {
                        if filter.matches(&path) {
                            let _ = tx.blocking_send(path);
                        }
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(path, RecursiveMode::Recursive)?;

        Ok(watcher)
    }

    /// Subscribe to file change events
    pub fn subscribe(&self) -> broadcast::Receiver<FileChangeEvent> {
        self.sender.subscribe()
    }

    /// Check if the watcher is active
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_extensions() {
        let filter = WatchFilter::frames_and_config();
        assert!(filter.matches(Path::new("frames/walk_0.png")));
        assert!(filter.matches(Path::new("frames/WALK_1.PNG")));
        assert!(filter.matches(Path::new("pixelsheet.yaml")));
        assert!(filter.matches(Path::new("alt.yml")));
        assert!(!filter.matches(Path::new("scene.blend")));
        assert!(!filter.matches(Path::new("Makefile")));
    }

    #[test]
    fn test_filter_ignores_own_output() {
        let filter =
            WatchFilter::frames_and_config().ignore([PathBuf::from("/project/sheet.png")]);
        assert!(!filter.matches(Path::new("/project/sheet.png")));
        assert!(filter.matches(Path::new("/project/frames/a.png")));
    }

    #[tokio::test]
    async fn test_missing_path_is_inactive() {
        let watcher = FileWatcher::new(
            Path::new("/nonexistent/pixelsheet-watch"),
            WatchFilter::frames_and_config(),
        );
        assert!(!watcher.is_active());
    }

    #[tokio::test]
    async fn test_existing_path_is_active() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = FileWatcher::new(dir.path(), WatchFilter::frames_and_config());
        assert!(watcher.is_active());
    }
}
