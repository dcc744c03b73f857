//! Summary store: one directory per channel, one Markdown file per video.
//!
//! The store is also the run state. There is no separate state file: a video
//! id is "already processed" exactly when `{root}/{channel_id}/{video_id}.md`
//! exists, and the orchestrator reconstructs that set by listing the channel
//! directory at the start of every run. Writes are append-only from the
//! orchestrator's point of view: it checks membership before writing and
//! never overwrites an existing summary.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use tubedigest_shared::{Result, TubedigestError};

/// File extension for stored summaries.
const SUMMARY_EXT: &str = "md";

// ---------------------------------------------------------------------------
// SummaryStore
// ---------------------------------------------------------------------------

/// Capability interface over the per-channel summary store.
///
/// Kept as a trait so the directory backend can later be swapped for a
/// key-value store without touching the orchestrator.
pub trait SummaryStore: Send + Sync {
    /// The set of video ids with a stored summary for `channel_id`.
    /// A channel that has never been written is an empty set, not an error.
    fn list(&self, channel_id: &str) -> Result<BTreeSet<String>>;

    /// Whether a summary for `video_id` is already stored.
    fn exists(&self, channel_id: &str, video_id: &str) -> Result<bool> {
        Ok(self.list(channel_id)?.contains(video_id))
    }

    /// Store `content` under `channel_id`/`video_id`, creating the channel
    /// namespace if needed. A direct call for an id that is already stored
    /// overwrites silently; idempotency is the caller's `exists` guard.
    fn write(&self, channel_id: &str, video_id: &str, content: &str) -> Result<PathBuf>;

    /// The channel's storage namespace path (used by the commit step).
    fn channel_dir(&self, channel_id: &str) -> PathBuf;
}

// ---------------------------------------------------------------------------
// DirStore
// ---------------------------------------------------------------------------

/// Directory-backed [`SummaryStore`].
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Create a store rooted at `root`. The root itself is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn summary_path(&self, channel_id: &str, video_id: &str) -> PathBuf {
        self.channel_dir(channel_id)
            .join(format!("{video_id}.{SUMMARY_EXT}"))
    }
}

impl SummaryStore for DirStore {
    fn list(&self, channel_id: &str) -> Result<BTreeSet<String>> {
        let dir = self.channel_dir(channel_id);
        if !dir.exists() {
            return Ok(BTreeSet::new());
        }

        let mut ids = BTreeSet::new();
        let entries =
            std::fs::read_dir(&dir).map_err(|e| TubedigestError::Storage(format!("{}: {e}", dir.display())))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| TubedigestError::Storage(format!("{}: {e}", dir.display())))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(SUMMARY_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.insert(stem.to_string());
                }
            }
        }
        Ok(ids)
    }

    fn write(&self, channel_id: &str, video_id: &str, content: &str) -> Result<PathBuf> {
        let dir = self.channel_dir(channel_id);
        std::fs::create_dir_all(&dir)
            .map_err(|e| TubedigestError::Storage(format!("{}: {e}", dir.display())))?;

        let path = self.summary_path(channel_id, video_id);
        std::fs::write(&path, content)
            .map_err(|e| TubedigestError::Storage(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), "summary written");
        Ok(path)
    }

    fn channel_dir(&self, channel_id: &str) -> PathBuf {
        self.root.join(channel_id)
    }
}
