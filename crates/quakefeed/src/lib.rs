//! Quakefeed - Earthquake-Bulletin Watcher & Relay
//!
//! Watches a spool directory for newly written bulletin files and dispatches
//! their contents to a configured sink: formatted messages to a
//! messaging-channel API (`relay`) or structured rows to MariaDB (`ingest`).
//!
//! The moving parts live in the member crates; this crate wires them
//! together and owns the per-file dispatch pipeline.

pub mod pipeline;

pub use pipeline::{file_kind, DispatchSummary, FileKind, Pipeline, PipelineError};
