//! Quakefeed Bulletin - Parsing Core
//!
//! Pure functions over earthquake-bulletin text: a delimiter-aware field
//! splitter, a fixed-arity record classifier, and the two message
//! formatters (structured template and size-bounded chunking).
//!
//! Nothing in this crate does I/O. The dispatch pipeline in the `quakefeed`
//! binary feeds file contents through these functions and hands the results
//! to a sink.

pub mod format;
pub mod record;
pub mod split;

pub use format::{chunk_text, format_record, ChunkedMessages, MAX_MESSAGE_CHARS};
pub use record::{classify, is_time_remnant, RecordError, SeismicRecord, BULLETIN_ARITY};
pub use split::{split_fields, DEFAULT_DELIMITER};
