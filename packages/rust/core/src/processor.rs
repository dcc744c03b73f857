//! Per-video processing: transcript → summary → rendered Markdown.

use tubedigest_shared::{Result, VideoEntry};
use tubedigest_summarize::Summarizer;

/// The rendered, persisted output for one video.
#[derive(Debug, Clone)]
pub struct SummaryArtifact {
    /// The video this summary was produced from.
    pub video_id: String,
    /// Video title, used as the digest subject in single-video runs.
    pub title: String,
    /// The full rendered document: heading, summary body, provenance footer.
    pub markdown: String,
}

/// Summarize one video's transcript and render the stored document.
///
/// Summarizer failures propagate uncaught; there is no retry here. The next
/// run picks the video up again since nothing was persisted.
pub async fn process(
    summarizer: &dyn Summarizer,
    transcript: &str,
    entry: &VideoEntry,
) -> Result<SummaryArtifact> {
    let summary = summarizer.summarize(transcript).await?;

    Ok(SummaryArtifact {
        video_id: entry.video_id.clone(),
        title: entry.title.clone(),
        markdown: render_summary(&summary, entry),
    })
}

/// Render the stored document: `# title`, blank line, summary body, blank
/// line, provenance footer, trailing newline. The exact shape is load-bearing:
/// the digest builder demotes the heading by prefixing one `#`.
fn render_summary(summary: &str, entry: &VideoEntry) -> String {
    format!(
        "# {}\n\n{}\n\n*Published on {} at {}*\n",
        entry.title, summary, entry.published, entry.url
    )
}
