//! Video transcript retrieval.
//!
//! Fetches a video's caption track from the timedtext endpoint and flattens
//! the timed cues into one plain-text string for summarization.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use tubedigest_shared::{Result, TubedigestError};

/// Default timeout in seconds for transcript requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Caption endpoint origin.
const DEFAULT_BASE_URL: &str = "https://video.google.com";

/// Caption language requested.
const CAPTION_LANG: &str = "en";

/// User-Agent string for transcript requests.
const USER_AGENT: &str = concat!("tubedigest/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// TranscriptSource
// ---------------------------------------------------------------------------

/// Capability interface for retrieving a video's raw transcript text.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for `video_id` as a single string.
    async fn fetch(&self, video_id: &str) -> Result<String>;
}

/// Timedtext-backed [`TranscriptSource`].
pub struct TimedTextSource {
    client: Client,
    base_url: Url,
}

impl TimedTextSource {
    /// Create a source against the default caption endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a source against a different origin (tests, proxies).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TubedigestError::config(format!("invalid timedtext base url: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TubedigestError::transcript("", format!("client build: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn caption_url(&self, video_id: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join("/api/timedtext")
            .map_err(|e| TubedigestError::transcript(video_id, format!("caption url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("lang", CAPTION_LANG)
            .append_pair("v", video_id);
        Ok(url)
    }
}

#[async_trait]
impl TranscriptSource for TimedTextSource {
    #[instrument(skip_all, fields(video_id = %video_id))]
    async fn fetch(&self, video_id: &str) -> Result<String> {
        let url = self.caption_url(video_id)?;
        debug!(%url, "fetching transcript");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| TubedigestError::transcript(video_id, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TubedigestError::transcript(
                video_id,
                format!("HTTP {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TubedigestError::transcript(video_id, format!("body read failed: {e}")))?;

        let text = flatten_cues(&body)
            .map_err(|e| TubedigestError::transcript(video_id, e))?;
        if text.is_empty() {
            return Err(TubedigestError::transcript(video_id, "empty caption track"));
        }
        Ok(text)
    }
}

/// Flatten a `<transcript><text …>…</text>…</transcript>` document into one
/// space-joined string.
fn flatten_cues(xml: &str) -> std::result::Result<String, String> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| format!("invalid caption XML: {e}"))?;

    let root = doc.root_element();
    if root.tag_name().name() != "transcript" {
        return Err(format!(
            "expected <transcript> root element, found <{}>",
            root.tag_name().name()
        ));
    }

    let cues: Vec<&str> = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "text")
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    Ok(cues.join(" "))
}
