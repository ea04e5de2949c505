//! Quakefeed Sinks - Outbound Collaborators
//!
//! The dispatch pipeline hands finished messages and records to a sink:
//! either the messaging-channel HTTP API ([`channel::ChannelClient`]) or the
//! relational event store ([`relational::EventStore`]).
//!
//! Sinks are best-effort: failures are reported to the caller, which logs
//! them and moves on. There is no retry or rollback here.

use thiserror::Error;

pub mod channel;
pub mod relational;

pub use channel::{ChannelClient, ChannelId};
pub use relational::EventStore;

/// Errors returned by sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The configured channel name is unknown to the messaging API.
    /// Fatal at startup.
    #[error("channel '{0}' not found")]
    ChannelNotFound(String),

    /// The messaging API answered with a non-success status.
    #[error("channel API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for sink operations.
pub type SinkResult<T> = std::result::Result<T, SinkError>;
