//! End-to-end channel run: fetch → diff → summarize → persist → digest →
//! notify → optional commit.
//!
//! The run is strictly sequential. The summarization backend is rate-limited,
//! so videos are processed one at a time with a configurable pause between
//! consecutive calls, never concurrently.
//!
//! The summary store is the only run state. Every summary is persisted the
//! moment it is produced, so a failure on video *k* loses nothing from videos
//! *1..k-1*: the next run re-lists the store, sees them present, and resumes
//! at *k*. Re-running after a notification failure re-sends the digest
//! (at-least-once delivery) but never re-summarizes stored videos.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use tubedigest_feed::{FeedInput, FeedSource, parse_feed};
use tubedigest_notify::Notifier;
use tubedigest_shared::{ChannelSnapshot, Result, RunId, TubedigestError, VideoEntry};
use tubedigest_store::SummaryStore;
use tubedigest_summarize::Summarizer;
use tubedigest_transcript::TranscriptSource;

use crate::digest::build_digest;
use crate::processor::{self, SummaryArtifact};
use crate::vcs::CommitService;

// ---------------------------------------------------------------------------
// Options & report
// ---------------------------------------------------------------------------

/// Per-run options (CLI flags merged with config defaults).
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Digest recipient address.
    pub recipient: String,
    /// Process at most this many new videos, first-in-feed-order.
    pub max_summaries: Option<usize>,
    /// Pause between consecutive summarization calls.
    pub pacing: Duration,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Run identifier (time-sortable), for log correlation.
    pub run_id: RunId,
    /// The authoritative channel id used for storage.
    pub channel_id: String,
    /// Channel display title from the feed.
    pub channel_title: String,
    /// Total entries in the fetched feed.
    pub videos_in_feed: usize,
    /// Summaries produced and persisted by this run.
    pub new_summaries: usize,
    /// Whether a digest email went out.
    pub notified: bool,
    /// Whether the channel directory was committed and pushed.
    pub committed: bool,
    /// Set when the commit step failed; the run itself still succeeded.
    pub commit_warning: Option<String>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each video's summary is persisted.
    fn video_summarized(&self, title: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn video_summarized(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// ChannelSummarizer
// ---------------------------------------------------------------------------

/// The run orchestrator. Holds borrowed capability collaborators so tests can
/// substitute deterministic fakes; owns no state between runs, since the
/// store is the state.
pub struct ChannelSummarizer<'a> {
    feed: &'a dyn FeedSource,
    transcripts: &'a dyn TranscriptSource,
    summarizer: &'a dyn Summarizer,
    notifier: &'a dyn Notifier,
    store: &'a dyn SummaryStore,
    vcs: Option<&'a dyn CommitService>,
}

impl<'a> ChannelSummarizer<'a> {
    pub fn new(
        feed: &'a dyn FeedSource,
        transcripts: &'a dyn TranscriptSource,
        summarizer: &'a dyn Summarizer,
        notifier: &'a dyn Notifier,
        store: &'a dyn SummaryStore,
    ) -> Self {
        Self {
            feed,
            transcripts,
            summarizer,
            notifier,
            store,
            vcs: None,
        }
    }

    /// Enable the commit-and-push side effect after successful notification.
    pub fn with_commit_service(mut self, vcs: &'a dyn CommitService) -> Self {
        self.vcs = Some(vcs);
        self
    }

    /// Run the full pipeline for one channel.
    #[instrument(skip_all, fields(input = ?input))]
    pub async fn run(
        &self,
        input: &FeedInput,
        opts: &RunOptions,
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let start = Instant::now();
        let run_id = RunId::new();

        progress.phase("Fetching channel feed");
        let raw = self.feed.fetch(input).await?;

        progress.phase("Computing new videos");
        let snapshot = parse_feed(&raw)?;
        let channel_id = resolve_channel_id(input, &snapshot)?;
        let new_entries = self.new_entries(&channel_id, &snapshot, opts.max_summaries)?;

        info!(
            %run_id,
            channel_id = %channel_id,
            found = snapshot.entries.len(),
            new = new_entries.len(),
            "feed diff computed"
        );

        if new_entries.is_empty() {
            let report = RunReport {
                run_id,
                channel_id,
                channel_title: snapshot.channel_title,
                videos_in_feed: snapshot.entries.len(),
                new_summaries: 0,
                notified: false,
                committed: false,
                commit_warning: None,
                elapsed: start.elapsed(),
            };
            progress.done(&report);
            return Ok(report);
        }

        progress.phase("Summarizing new videos");
        let artifacts = self
            .process_all(&channel_id, &new_entries, opts.pacing, progress)
            .await?;

        progress.phase("Building digest");
        let digest = build_digest(
            self.summarizer,
            &snapshot.channel_title,
            &channel_id,
            &artifacts,
        )
        .await?;

        progress.phase("Sending digest email");
        self.notifier
            .send(&opts.recipient, &digest.subject, &digest.body)
            .await?;

        let (committed, commit_warning) =
            self.maybe_commit(&channel_id, &snapshot.channel_title, artifacts.len(), progress);

        let report = RunReport {
            run_id,
            channel_id,
            channel_title: snapshot.channel_title,
            videos_in_feed: snapshot.entries.len(),
            new_summaries: artifacts.len(),
            notified: true,
            committed,
            commit_warning,
            elapsed: start.elapsed(),
        };

        info!(
            run_id = %report.run_id,
            new_summaries = report.new_summaries,
            committed = report.committed,
            elapsed_ms = report.elapsed.as_millis(),
            "run complete"
        );

        progress.done(&report);
        Ok(report)
    }

    /// Diff the snapshot against the store, in source order, then apply the
    /// cap. Store membership is the only "already processed" signal.
    fn new_entries(
        &self,
        channel_id: &str,
        snapshot: &ChannelSnapshot,
        max_summaries: Option<usize>,
    ) -> Result<Vec<VideoEntry>> {
        let mut new = Vec::new();
        for entry in &snapshot.entries {
            if !self.store.exists(channel_id, &entry.video_id)? {
                new.push(entry.clone());
            }
        }
        if let Some(cap) = max_summaries {
            new.truncate(cap);
        }
        Ok(new)
    }

    /// Summarize and persist each entry sequentially, pausing between
    /// consecutive items. The first failure aborts the run; everything
    /// persisted so far stays persisted.
    async fn process_all(
        &self,
        channel_id: &str,
        entries: &[VideoEntry],
        pacing: Duration,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<SummaryArtifact>> {
        let total = entries.len();
        let mut artifacts = Vec::with_capacity(total);

        for (i, entry) in entries.iter().enumerate() {
            info!(video_id = %entry.video_id, title = %entry.title, "summarizing video");

            let transcript = self.transcripts.fetch(&entry.video_id).await?;
            let artifact = processor::process(self.summarizer, &transcript, entry)
                .await
                .map_err(|e| with_video_context(e, &entry.video_id))?;
            self.store
                .write(channel_id, &entry.video_id, &artifact.markdown)
                .map_err(|e| with_video_context(e, &entry.video_id))?;

            progress.video_summarized(&entry.title, i + 1, total);
            artifacts.push(artifact);

            // Rate-limit spacing between calls; nothing to wait for after
            // the last one.
            if i + 1 < total && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
        }

        Ok(artifacts)
    }

    /// Commit-and-push the channel directory when enabled. Never fails the
    /// run: summaries and the notification are already durable.
    fn maybe_commit(
        &self,
        channel_id: &str,
        channel_title: &str,
        count: usize,
        progress: &dyn ProgressReporter,
    ) -> (bool, Option<String>) {
        let Some(vcs) = self.vcs else {
            return (false, None);
        };

        progress.phase("Committing summaries");
        let dir = self.store.channel_dir(channel_id);
        let message = format!("Add {count} video summaries for {channel_title}");

        match vcs.commit_and_push(&dir, &message) {
            Ok(()) => (true, None),
            Err(e) => {
                warn!(error = %e, "commit failed; summaries and notification are unaffected");
                (false, Some(e.to_string()))
            }
        }
    }
}

/// Which channel id owns the storage namespace.
///
/// In channel-id mode the caller-supplied id is authoritative. A local feed
/// capture has no caller-supplied id worth trusting, so the document must
/// declare one itself.
fn resolve_channel_id(input: &FeedInput, snapshot: &ChannelSnapshot) -> Result<String> {
    match input {
        FeedInput::ChannelId(id) => Ok(id.clone()),
        FeedInput::LocalFile(path) => snapshot.channel_id.clone().ok_or_else(|| {
            TubedigestError::malformed_feed(format!(
                "local feed {} does not declare a channel id",
                path.display()
            ))
        }),
    }
}

/// Attach the failing video id to errors that do not already carry it.
fn with_video_context(err: TubedigestError, video_id: &str) -> TubedigestError {
    match err {
        TubedigestError::Summarize(m) => {
            TubedigestError::Summarize(format!("video {video_id}: {m}"))
        }
        TubedigestError::Storage(m) => TubedigestError::Storage(format!("video {video_id}: {m}")),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tubedigest_store::DirStore;

    const TEST_CHANNEL: &str = "UC_could_be_anything____";

    // -- fakes --------------------------------------------------------------

    struct StaticFeed {
        xml: String,
    }

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch(&self, _input: &FeedInput) -> Result<String> {
            Ok(self.xml.clone())
        }
    }

    /// Deterministic transcripts; optionally fails for one video id.
    struct ScriptedTranscripts {
        fail_on: Option<&'static str>,
    }

    impl ScriptedTranscripts {
        fn reliable() -> Self {
            Self { fail_on: None }
        }
    }

    #[async_trait]
    impl TranscriptSource for ScriptedTranscripts {
        async fn fetch(&self, video_id: &str) -> Result<String> {
            if self.fail_on == Some(video_id) {
                return Err(TubedigestError::transcript(video_id, "captions disabled"));
            }
            Ok(format!(
                "{video_id} spoken words about one two three four five six seven eight nine"
            ))
        }
    }

    /// First ten words plus a word count, heading markers dropped. Keeps
    /// digests deterministic and readable in assertions.
    struct TruncatingSummarizer;

    #[async_trait]
    impl Summarizer for TruncatingSummarizer {
        async fn summarize(&self, text: &str) -> Result<String> {
            let words: Vec<&str> = text
                .split_whitespace()
                .filter(|w| !w.chars().all(|c| c == '#'))
                .collect();
            if words.len() <= 10 {
                return Ok(words.join(" "));
            }
            Ok(format!(
                "{}... and {} more words",
                words[..10].join(" "),
                words.len() - 10
            ))
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String> {
            Err(TubedigestError::Summarize("quota exhausted".into()))
        }
    }

    #[derive(Debug, Clone)]
    struct SentMail {
        to: String,
        subject: String,
        body: String,
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<SentMail>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<SentMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
            self.sent.lock().unwrap().push(SentMail {
                to: to.into(),
                subject: subject.into(),
                body: body.into(),
            });
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<()> {
            Err(TubedigestError::Delivery("relay refused".into()))
        }
    }

    #[derive(Default)]
    struct RecordingCommit {
        calls: Mutex<Vec<(PathBuf, String)>>,
    }

    impl RecordingCommit {
        fn calls(&self) -> Vec<(PathBuf, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommitService for RecordingCommit {
        fn commit_and_push(&self, dir: &std::path::Path, message: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((dir.to_path_buf(), message.to_string()));
            Ok(())
        }
    }

    struct FailingCommit;

    impl CommitService for FailingCommit {
        fn commit_and_push(&self, _dir: &std::path::Path, _message: &str) -> Result<()> {
            Err(TubedigestError::Commit("remote rejected the push".into()))
        }
    }

    // -- helpers ------------------------------------------------------------

    fn feed_xml(
        channel_title: &str,
        channel_id: Option<&str>,
        entries: &[(&str, &str, &str)],
    ) -> String {
        let channel_id_elem = channel_id
            .map(|id| format!("<yt:channelId>{id}</yt:channelId>"))
            .unwrap_or_default();
        let entries_xml: String = entries
            .iter()
            .map(|(id, title, published)| {
                format!(
                    "<entry><yt:videoId>{id}</yt:videoId><title>{title}</title><published>{published}</published></entry>"
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
  <title>{channel_title}</title>
  {channel_id_elem}
  {entries_xml}
</feed>"#
        )
    }

    /// Two entries, ids "1" and "2", newest first.
    fn two_entry_feed(channel_title: &str) -> String {
        feed_xml(
            channel_title,
            None,
            &[
                ("1", "Alpha", "2025-09-11T00:00:00+00:00"),
                ("2", "Beta", "2025-09-10T00:00:00+00:00"),
            ],
        )
    }

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("td-pipeline-test-{}", uuid::Uuid::now_v7()))
    }

    fn opts() -> RunOptions {
        RunOptions {
            recipient: "user@example.com".into(),
            max_summaries: None,
            pacing: Duration::ZERO,
        }
    }

    fn channel_input() -> FeedInput {
        FeedInput::ChannelId(TEST_CHANNEL.into())
    }

    // -- tests --------------------------------------------------------------

    #[tokio::test]
    async fn writes_one_summary_file_per_video() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: two_entry_feed("My Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        let report = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.videos_in_feed, 2);
        assert_eq!(report.new_summaries, 2);
        assert!(report.notified);

        let alpha = std::fs::read_to_string(root.join(TEST_CHANNEL).join("1.md")).unwrap();
        assert_eq!(
            alpha,
            "# Alpha\n\n\
             1 spoken words about one two three four five six... and 3 more words\n\n\
             *Published on 2025-09-11T00:00:00+00:00 at https://www.youtube.com/watch?v=1*\n"
        );
        assert!(root.join(TEST_CHANNEL).join("2.md").is_file());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn stored_videos_are_skipped_and_left_untouched() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let existing = "existing summary";
        store.write(TEST_CHANNEL, "1", existing).unwrap();

        let feed = StaticFeed {
            xml: two_entry_feed("My Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        let report = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        // Only the absent id was processed; the stored file is byte-for-byte
        // unchanged.
        assert_eq!(report.new_summaries, 1);
        assert_eq!(
            std::fs::read_to_string(root.join(TEST_CHANNEL).join("1.md")).unwrap(),
            existing
        );
        assert!(root.join(TEST_CHANNEL).join("2.md").is_file());

        // One new video, so the digest is the single-video shape for Beta.
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "🎬 [YouTube Summaries][My Channel] Beta");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn cap_takes_the_first_videos_in_feed_order() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: two_entry_feed("My Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        let mut opts = opts();
        opts.max_summaries = Some(1);
        let report = orchestrator
            .run(&channel_input(), &opts, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.new_summaries, 1);
        assert!(root.join(TEST_CHANNEL).join("1.md").is_file());
        assert!(!root.join(TEST_CHANNEL).join("2.md").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn fully_caught_up_run_is_a_quiet_success() {
        let root = temp_root();
        let store = DirStore::new(&root);
        store.write(TEST_CHANNEL, "1", "a").unwrap();
        store.write(TEST_CHANNEL, "2", "b").unwrap();

        let feed = StaticFeed {
            xml: two_entry_feed("My Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();
        let commits = RecordingCommit::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        )
        .with_commit_service(&commits);
        let report = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.new_summaries, 0);
        assert!(!report.notified);
        assert!(!report.committed);
        assert!(notifier.sent().is_empty());
        assert!(commits.calls().is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn single_new_video_digest_uses_the_video_title() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: feed_xml(
                "Kitten Channel",
                None,
                &[("1", "Alpha", "2025-09-11T00:00:00+00:00")],
            ),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "user@example.com");
        assert_eq!(
            sent[0].subject,
            "🎬 [YouTube Summaries][Kitten Channel] Alpha"
        );
        // The body is the bare summary document, no batch framing.
        assert!(sent[0].body.starts_with("# Alpha\n"));
        assert!(!sent[0].body.contains("At a glance"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn multi_video_digest_counts_and_aggregates() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: two_entry_feed("Dog Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].subject,
            "🎬 [YouTube Summaries][Dog Channel] 2 New Video Summaries Available"
        );
        assert!(sent[0].body.starts_with(&format!(
            "# Summaries for channel Dog Channel ({TEST_CHANNEL})\n"
        )));
        assert!(sent[0].body.contains("## At a glance\n"));
        // Both summaries, demoted under the digest heading.
        assert!(sent[0].body.contains("## Alpha\n"));
        assert!(sent[0].body.contains("## Beta\n"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn failure_midway_keeps_earlier_summaries_and_resumes() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: feed_xml(
                "My Channel",
                None,
                &[
                    ("1", "Alpha", "2025-09-11T00:00:00+00:00"),
                    ("2", "Beta", "2025-09-10T00:00:00+00:00"),
                    ("3", "Gamma", "2025-09-09T00:00:00+00:00"),
                ],
            ),
        };
        let notifier = RecordingNotifier::default();

        // First run: transcript retrieval dies on video "2".
        let flaky = ScriptedTranscripts { fail_on: Some("2") };
        let orchestrator =
            ChannelSummarizer::new(&feed, &flaky, &TruncatingSummarizer, &notifier, &store);
        let err = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, TubedigestError::TranscriptUnavailable { .. }));

        // Video 1 is durable; 2 and 3 were never written; nothing was sent.
        assert!(root.join(TEST_CHANNEL).join("1.md").is_file());
        assert!(!root.join(TEST_CHANNEL).join("2.md").exists());
        assert!(!root.join(TEST_CHANNEL).join("3.md").exists());
        assert!(notifier.sent().is_empty());

        // Second run with the failure gone completes only the remainder.
        let reliable = ScriptedTranscripts::reliable();
        let orchestrator =
            ChannelSummarizer::new(&feed, &reliable, &TruncatingSummarizer, &notifier, &store);
        let report = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.new_summaries, 2);
        assert!(root.join(TEST_CHANNEL).join("2.md").is_file());
        assert!(root.join(TEST_CHANNEL).join("3.md").is_file());
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("2 New Video Summaries"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn summarizer_failure_names_the_video() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: two_entry_feed("My Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator =
            ChannelSummarizer::new(&feed, &transcripts, &FailingSummarizer, &notifier, &store);
        let err = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, TubedigestError::Summarize(_)));
        assert!(err.to_string().contains("video 1"));
        assert!(notifier.sent().is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn notify_failure_is_fatal_but_summaries_persist() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: two_entry_feed("My Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &FailingNotifier,
            &store,
        );
        let err = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, TubedigestError::Delivery(_)));
        // Already-summarized work survives; the next run will just re-send.
        assert!(root.join(TEST_CHANNEL).join("1.md").is_file());
        assert!(root.join(TEST_CHANNEL).join("2.md").is_file());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn commit_message_names_count_and_channel_title() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: two_entry_feed("Dog Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();
        let commits = RecordingCommit::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        )
        .with_commit_service(&commits);
        let report = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        assert!(report.committed);
        assert!(report.commit_warning.is_none());
        let calls = commits.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.ends_with(TEST_CHANNEL));
        assert_eq!(calls[0].1, "Add 2 video summaries for Dog Channel");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn commit_failure_downgrades_to_warning() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: two_entry_feed("My Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        )
        .with_commit_service(&FailingCommit);
        let report = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        // The run still succeeded: summaries written, digest sent.
        assert!(report.notified);
        assert!(!report.committed);
        assert!(
            report
                .commit_warning
                .as_deref()
                .unwrap()
                .contains("remote rejected")
        );
        assert_eq!(notifier.sent().len(), 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn local_feed_uses_the_declared_channel_id() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let declared = "UCfeeddeclared0123456789";
        let feed = StaticFeed {
            xml: feed_xml(
                "My Channel",
                Some(declared),
                &[("1", "Alpha", "2025-09-11T00:00:00+00:00")],
            ),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        let input = FeedInput::LocalFile(PathBuf::from("capture.xml"));
        let report = orchestrator
            .run(&input, &opts(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.channel_id, declared);
        assert!(root.join(declared).join("1.md").is_file());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn local_feed_without_channel_id_is_rejected() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: two_entry_feed("My Channel"),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        let input = FeedInput::LocalFile(PathBuf::from("capture.xml"));
        let err = orchestrator
            .run(&input, &opts(), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, TubedigestError::MalformedFeed { .. }));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn caller_supplied_id_wins_in_channel_mode() {
        let root = temp_root();
        let store = DirStore::new(&root);
        // The feed declares a different id; the caller's id owns the namespace.
        let feed = StaticFeed {
            xml: feed_xml(
                "My Channel",
                Some("UCsomeotherdeclaredid0000"),
                &[("1", "Alpha", "2025-09-11T00:00:00+00:00")],
            ),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        let report = orchestrator
            .run(&channel_input(), &opts(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.channel_id, TEST_CHANNEL);
        assert!(root.join(TEST_CHANNEL).join("1.md").is_file());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_pauses_between_consecutive_videos_only() {
        let root = temp_root();
        let store = DirStore::new(&root);
        let feed = StaticFeed {
            xml: feed_xml(
                "My Channel",
                None,
                &[
                    ("1", "Alpha", "2025-09-11T00:00:00+00:00"),
                    ("2", "Beta", "2025-09-10T00:00:00+00:00"),
                    ("3", "Gamma", "2025-09-09T00:00:00+00:00"),
                ],
            ),
        };
        let transcripts = ScriptedTranscripts::reliable();
        let notifier = RecordingNotifier::default();

        let orchestrator = ChannelSummarizer::new(
            &feed,
            &transcripts,
            &TruncatingSummarizer,
            &notifier,
            &store,
        );
        let mut opts = opts();
        opts.pacing = Duration::from_secs(1);

        let started = tokio::time::Instant::now();
        orchestrator
            .run(&channel_input(), &opts, &SilentProgress)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        // Three videos: two pauses, none after the last.
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));

        let _ = std::fs::remove_dir_all(&root);
    }
}
