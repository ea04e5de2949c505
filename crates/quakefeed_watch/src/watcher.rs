//! Non-recursive directory watcher on top of `notify`.
//!
//! The watcher forwards creation events for regular files into a tokio
//! channel and drops everything else. Some platforms report new files as
//! `CreateKind::Any` or surface directory creations with the same kind, so
//! the kind check is paired with a metadata check before forwarding.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use notify::{event::CreateKind, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Watcher errors.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// What the watcher observed for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Created,
    Other,
}

/// One filesystem notification, consumed once by the debouncer.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
    pub occurred_at: SystemTime,
}

impl WatchEvent {
    pub fn created(path: PathBuf) -> Self {
        Self {
            path,
            kind: WatchEventKind::Created,
            occurred_at: SystemTime::now(),
        }
    }
}

/// Handle for a running directory watch.
///
/// Watching stops when the handle is dropped.
pub struct DirWatcher {
    _watcher: RecommendedWatcher,
    dir: PathBuf,
}

impl DirWatcher {
    /// Start watching `dir` (non-recursive), creating it if missing.
    ///
    /// Returns the handle and the receiving end of the event stream.
    pub fn start(dir: &Path) -> Result<(Self, mpsc::UnboundedReceiver<WatchEvent>), WatchError> {
        std::fs::create_dir_all(dir)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    if !is_create_event(&event.kind) {
                        return;
                    }
                    for path in event.paths {
                        if !is_regular_file(&path) {
                            debug!(path = %path.display(), "ignoring non-file creation");
                            continue;
                        }
                        // Receiver may already be gone during shutdown.
                        let _ = event_tx.send(WatchEvent::created(path));
                    }
                }
                Err(err) => warn!("watcher error: {err}"),
            }
        })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok((
            Self {
                _watcher: watcher,
                dir: dir.to_path_buf(),
            },
            event_rx,
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn is_create_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(CreateKind::File) | EventKind::Create(CreateKind::Any)
    )
}

fn is_regular_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
