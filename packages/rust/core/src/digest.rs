//! Digest assembly for a run's newly produced summaries.
//!
//! The single-video and multi-video shapes diverge on purpose: the subject
//! line alone tells the reader whether one video or a batch is waiting. A
//! lone summary is sent as-is under its own title; a batch gets a channel
//! heading, an "At a glance" meta-summary of the whole batch, then every
//! summary demoted one heading level.

use tracing::debug;

use tubedigest_shared::Result;
use tubedigest_summarize::Summarizer;

use crate::processor::SummaryArtifact;

/// Subject prefix shared by both digest shapes.
const SUBJECT_TAG: &str = "🎬 [YouTube Summaries]";

/// The aggregated notification payload for one run. Built and dispatched
/// once per run, never persisted.
#[derive(Debug, Clone)]
pub struct Digest {
    /// Email subject line.
    pub subject: String,
    /// Email body, Markdown.
    pub body: String,
}

/// Build the digest for a non-empty batch of summaries.
///
/// The caller (the orchestrator) short-circuits the empty case before ever
/// getting here; an empty batch is a caller bug.
pub async fn build_digest(
    summarizer: &dyn Summarizer,
    channel_title: &str,
    channel_id: &str,
    artifacts: &[SummaryArtifact],
) -> Result<Digest> {
    debug_assert!(!artifacts.is_empty(), "digest of an empty batch");

    if let [only] = artifacts {
        debug!(title = %only.title, "single-video digest");
        return Ok(Digest {
            subject: format!("{SUBJECT_TAG}[{channel_title}] {}", only.title),
            body: only.markdown.clone(),
        });
    }

    // Demote each summary one heading level so it nests under the digest's
    // own top-level heading, then summarize the whole batch for the
    // "At a glance" section.
    let demoted: Vec<String> = artifacts.iter().map(|a| format!("#{}", a.markdown)).collect();
    let combined = demoted.join("\n\n").trim().to_string();

    debug!(count = artifacts.len(), "multi-video digest, summarizing batch");
    let meta_summary = summarizer.summarize(&combined).await?;

    let body = format!(
        "# Summaries for channel {channel_title} ({channel_id})\n\n\
         ## At a glance\n\n\
         {meta_summary}\n\n\
         {combined}\n"
    );
    let subject = format!(
        "{SUBJECT_TAG}[{channel_title}] {} New Video Summaries Available",
        artifacts.len()
    );

    Ok(Digest { subject, body })
}
