//! Quakefeed Watch - Directory Watching & Debounce
//!
//! Turns raw filesystem creation notifications into debounced, fire-once
//! path emissions:
//!
//! ```text
//! ┌───────────┐      ┌────────────┐      ┌────────────────────┐
//! │  notify   │─────▶│ Debouncer  │─────▶│ dispatch pipeline  │
//! │ (watcher) │ event│ (per-path  │ path │ (quakefeed binary) │
//! │           │      │  table)    │      │                    │
//! └───────────┘      └────────────┘      └────────────────────┘
//! ```
//!
//! Creation events often arrive before the writer has flushed the file, so
//! every path waits out a settle delay before firing. A newer event for the
//! same path within the window supersedes the pending one; the eventual fire
//! reads whatever the file holds at that moment.

pub mod debounce;
pub mod watcher;

pub use debounce::Debouncer;
pub use watcher::{DirWatcher, WatchError, WatchEvent, WatchEventKind};
