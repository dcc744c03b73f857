//! Error types for tubedigest.
//!
//! Library crates use [`TubedigestError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all tubedigest operations.
#[derive(Debug, thiserror::Error)]
pub enum TubedigestError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The channel feed could not be parsed at all.
    #[error("malformed feed: {message}")]
    MalformedFeed { message: String },

    /// A feed entry is missing a required field; the whole parse is rejected.
    #[error("feed entry missing required field: {field}")]
    MissingField { field: &'static str },

    /// The channel feed could not be fetched or read.
    #[error("feed unavailable: {0}")]
    FeedUnavailable(String),

    /// The transcript for a video could not be retrieved.
    #[error("transcript unavailable for {video_id}: {message}")]
    TranscriptUnavailable { video_id: String, message: String },

    /// The summarization backend failed or returned an unusable response.
    #[error("summarization failed: {0}")]
    Summarize(String),

    /// Summary store error (permissions, disk, invalid path).
    #[error("storage error: {0}")]
    Storage(String),

    /// The digest email could not be delivered.
    #[error("email delivery failed: {0}")]
    Delivery(String),

    /// Committing the channel directory failed. Non-fatal for the run.
    #[error("commit failed: {0}")]
    Commit(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TubedigestError>;

impl TubedigestError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-feed error from any displayable message.
    pub fn malformed_feed(msg: impl Into<String>) -> Self {
        Self::MalformedFeed {
            message: msg.into(),
        }
    }

    /// Create a transcript error for a specific video.
    pub fn transcript(video_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TranscriptUnavailable {
            video_id: video_id.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
