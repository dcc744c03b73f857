//! Core domain types for tubedigest channel runs.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one orchestrator run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// VideoEntry
// ---------------------------------------------------------------------------

/// One video entry from a channel feed.
///
/// Identity is the `video_id`: two entries with the same id are the same
/// unit of work even if the feed republished them with a different title or
/// timestamp. The id is the storage key and the idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    /// Stable video identifier (unique within a channel).
    pub video_id: String,
    /// Video title as published in the feed.
    pub title: String,
    /// Publication timestamp, kept verbatim as it appeared in the feed.
    pub published: String,
    /// Canonical watch URL.
    pub url: String,
}

// ---------------------------------------------------------------------------
// ChannelSnapshot
// ---------------------------------------------------------------------------

/// The parsed, in-memory representation of one feed fetch.
///
/// Built fresh on every run and discarded afterwards; never persisted.
/// Entries keep the order they had in the feed document (newest first in
/// YouTube feeds); downstream truncation and digest ordering depend on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Channel id as declared by the feed itself (`yt:channelId`), when present.
    pub channel_id: Option<String>,
    /// Channel display title from the feed-level `<title>`.
    pub channel_title: String,
    /// Video entries in source order.
    pub entries: Vec<VideoEntry>,
}

// ---------------------------------------------------------------------------
// Channel id helpers
// ---------------------------------------------------------------------------

/// Matches a YouTube channel id: `UC` followed by 22 id-safe characters.
static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[0-9A-Za-z_-]{22}$").expect("channel id regex"));

/// Whether `s` looks like a YouTube channel id.
pub fn is_channel_id(s: &str) -> bool {
    CHANNEL_ID_RE.is_match(s)
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
