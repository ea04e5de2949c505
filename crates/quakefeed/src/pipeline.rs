//! Per-file dispatch pipeline.
//!
//! Runs once per settled path: read the file, parse it into messages or
//! records, then drain them to the sink in generation order. Failure
//! isolation follows three tiers: a read error aborts the file, a malformed
//! row is skipped while its siblings continue, and a failed send is logged
//! while the remaining sends are still attempted. Nothing here may take
//! down the watch loop.
//!
//! Messages accumulate in a per-invocation local buffer; concurrent
//! dispatches for different paths never share state beyond the read-only
//! channel id.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use quakefeed_bulletin::{
    chunk_text, classify, format_record, is_time_remnant, split_fields, SeismicRecord,
    DEFAULT_DELIMITER,
};
use quakefeed_sinks::channel::mime_for_path;
use quakefeed_sinks::{ChannelClient, ChannelId, EventStore};

/// Pipeline-fatal errors. Everything else is logged and skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a file's extension says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Structured bulletin rows (`.csv`).
    Bulletin,
    /// Free text, relayed in size-bounded chunks (`.txt`).
    FreeText,
    /// Image, forwarded as-is (`.png`, `.jpg`, `.jpeg`, `.gif`).
    Image,
    Unsupported,
}

/// Classify a path by extension, case-insensitive.
pub fn file_kind(path: &Path) -> FileKind {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => FileKind::Bulletin,
        Some("txt") => FileKind::FreeText,
        Some("png") | Some("jpg") | Some("jpeg") | Some("gif") => FileKind::Image,
        _ => FileKind::Unsupported,
    }
}

/// Where dispatched output goes.
enum Sink {
    Channel {
        client: ChannelClient,
        channel: ChannelId,
    },
    Database {
        store: EventStore,
    },
}

/// Counters for one dispatch invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Messages (or records) delivered to the sink.
    pub sent: usize,
    /// Rows rejected by the classifier.
    pub skipped_rows: usize,
    /// Sends the sink refused; later sends were still attempted.
    pub failed_sends: usize,
}

/// The per-file dispatch pipeline. One instance per process, shared
/// read-only across concurrent dispatches.
pub struct Pipeline {
    sink: Sink,
    delimiter: char,
}

impl Pipeline {
    /// Relay deployment: formatted messages and images to a channel.
    pub fn relay(client: ChannelClient, channel: ChannelId) -> Self {
        Self {
            sink: Sink::Channel { client, channel },
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Ingest deployment: structured rows to the relational store.
    pub fn ingest(store: EventStore) -> Self {
        Self {
            sink: Sink::Database { store },
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Whether this deployment reacts to the given path at all. Checked
    /// before the debounce delay is even scheduled.
    pub fn accepts(&self, path: &Path) -> bool {
        match (&self.sink, file_kind(path)) {
            (Sink::Channel { .. }, FileKind::Bulletin | FileKind::FreeText | FileKind::Image) => {
                true
            }
            (Sink::Database { .. }, FileKind::Bulletin) => true,
            _ => false,
        }
    }

    /// Run the full pipeline for one settled path.
    pub async fn dispatch(&self, path: &Path) -> Result<DispatchSummary, PipelineError> {
        match file_kind(path) {
            FileKind::Bulletin => self.dispatch_bulletin(path).await,
            FileKind::FreeText => self.dispatch_text(path).await,
            FileKind::Image => self.dispatch_image(path).await,
            FileKind::Unsupported => {
                debug!(path = %path.display(), "unsupported file kind, nothing to do");
                Ok(DispatchSummary::default())
            }
        }
    }

    async fn dispatch_bulletin(&self, path: &Path) -> Result<DispatchSummary, PipelineError> {
        let text = read_to_string(path).await?;
        let mut summary = DispatchSummary::default();

        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < 2 {
            warn!(
                path = %path.display(),
                rows = lines.len(),
                "bulletin has too few rows, nothing to dispatch"
            );
            return Ok(summary);
        }

        let mut records: Vec<SeismicRecord> = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let fields = split_fields(line, self.delimiter);
            if index == 0 && is_time_remnant(&fields) {
                debug!(path = %path.display(), "skipping stray time-stamp header");
                continue;
            }
            match classify(&fields, self.delimiter) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        line = index + 1,
                        raw = %line,
                        "skipping malformed row: {err}"
                    );
                    summary.skipped_rows += 1;
                }
            }
        }

        match &self.sink {
            Sink::Channel { client, channel } => {
                let messages: Vec<String> = records.iter().map(format_record).collect();
                for message in &messages {
                    match client.send_text(channel, message).await {
                        Ok(()) => summary.sent += 1,
                        Err(err) => {
                            error!(path = %path.display(), "message send failed: {err}");
                            summary.failed_sends += 1;
                        }
                    }
                }
            }
            Sink::Database { store } => {
                for record in &records {
                    match store.insert(record).await {
                        Ok(()) => {
                            info!(fecha = %record.fecha, hora = %record.hora, "record stored");
                            summary.sent += 1;
                        }
                        Err(err) => {
                            error!(
                                path = %path.display(),
                                fecha = %record.fecha,
                                hora = %record.hora,
                                "record insert failed: {err}"
                            );
                            summary.failed_sends += 1;
                        }
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn dispatch_text(&self, path: &Path) -> Result<DispatchSummary, PipelineError> {
        let Sink::Channel { client, channel } = &self.sink else {
            debug!(path = %path.display(), "free text ignored by this deployment");
            return Ok(DispatchSummary::default());
        };

        let text = read_to_string(path).await?;
        let mut summary = DispatchSummary::default();

        let messages: Vec<String> = chunk_text(&text).collect();
        for message in &messages {
            match client.send_text(channel, message).await {
                Ok(()) => summary.sent += 1,
                Err(err) => {
                    error!(path = %path.display(), "message send failed: {err}");
                    summary.failed_sends += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn dispatch_image(&self, path: &Path) -> Result<DispatchSummary, PipelineError> {
        let Sink::Channel { client, channel } = &self.sink else {
            debug!(path = %path.display(), "image ignored by this deployment");
            return Ok(DispatchSummary::default());
        };

        let bytes = tokio::fs::read(path).await.map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mime = mime_for_path(path);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image");

        let mut summary = DispatchSummary::default();
        match client.send_image(channel, file_name, mime, &bytes).await {
            Ok(()) => summary.sent += 1,
            Err(err) => {
                error!(path = %path.display(), "image send failed: {err}");
                summary.failed_sends += 1;
            }
        }

        Ok(summary)
    }
}

async fn read_to_string(path: &Path) -> Result<String, PipelineError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })
}
