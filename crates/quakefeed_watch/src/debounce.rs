//! Per-path debounce scheduler.
//!
//! Every creation event schedules a deferred fire for its path after the
//! settle delay. The scheduler keeps an explicit table of pending entries
//! keyed by path; a newer event overwrites the entry (last-event-wins), and
//! a sleep task fires only if its sequence number still matches the table.
//! Firing removes the entry first, so duplicate notifications inside the
//! window collapse into exactly one emission.
//!
//! The delay is a pragmatic wait for the writer to finish flushing, not a
//! file-stability detector. The fire reads nothing itself; it hands the path
//! to the consumer, which reads the file's contents at that moment.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::watcher::{WatchEvent, WatchEventKind};

/// A scheduled, not-yet-fired dispatch for one path.
#[derive(Debug, Clone, Copy)]
struct PendingDispatch {
    seq: u64,
    deadline: Instant,
}

/// Debounce scheduler. Emits each settled path on the channel returned by
/// [`Debouncer::new`].
pub struct Debouncer {
    settle: Duration,
    next_seq: AtomicU64,
    pending: Arc<Mutex<HashMap<PathBuf, PendingDispatch>>>,
    fired_tx: mpsc::UnboundedSender<PathBuf>,
}

impl Debouncer {
    pub fn new(settle: Duration) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        (
            Self {
                settle,
                next_seq: AtomicU64::new(0),
                pending: Arc::new(Mutex::new(HashMap::new())),
                fired_tx,
            },
            fired_rx,
        )
    }

    /// Handle one watch event. Non-creation events and directories are
    /// ignored; anything else (re)schedules a fire for the path.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_event(&self, event: &WatchEvent) {
        if event.kind != WatchEventKind::Created || event.path.is_dir() {
            return;
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + self.settle;
        let path = event.path.clone();

        {
            let Ok(mut pending) = self.pending.lock() else {
                warn!("debounce table lock poisoned, dropping event");
                return;
            };
            if let Some(previous) = pending.insert(path.clone(), PendingDispatch { seq, deadline }) {
                let remaining = previous.deadline.saturating_duration_since(Instant::now());
                debug!(
                    path = %path.display(),
                    remaining_ms = remaining.as_millis() as u64,
                    "superseding pending dispatch"
                );
            }
        }

        let pending = Arc::clone(&self.pending);
        let fired_tx = self.fired_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            let fire = {
                let Ok(mut pending) = pending.lock() else {
                    warn!("debounce table lock poisoned, dropping fire");
                    return;
                };
                match pending.get(&path) {
                    Some(entry) if entry.seq == seq => {
                        pending.remove(&path);
                        true
                    }
                    // Superseded by a newer event, or already fired.
                    _ => false,
                }
            };

            if fire {
                // Receiver gone means the process is shutting down.
                let _ = fired_tx.send(path);
            }
        });
    }

    /// Number of paths currently waiting out their settle delay.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}
