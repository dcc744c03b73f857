//! Channel feed retrieval and snapshot parsing.
//!
//! A run starts from either a channel id (fetched over HTTP from the
//! channel's Atom feed endpoint) or a pre-captured local feed file. Both
//! modes yield the same raw XML, which [`parse_feed`] turns into a
//! [`ChannelSnapshot`](tubedigest_shared::ChannelSnapshot).

mod parser;

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use tubedigest_shared::{Result, TubedigestError};

pub use parser::parse_feed;

/// Default timeout in seconds for fetching the feed.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Feed endpoint origin for the hosted mode.
const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("tubedigest/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// FeedInput
// ---------------------------------------------------------------------------

/// Where a run's feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedInput {
    /// Fetch the channel's published feed over HTTP.
    ChannelId(String),
    /// Read a previously captured feed document from disk. The channel id
    /// is taken from the document itself in this mode.
    LocalFile(PathBuf),
}

// ---------------------------------------------------------------------------
// FeedSource
// ---------------------------------------------------------------------------

/// Capability interface for obtaining raw feed XML.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the raw feed document for `input`.
    async fn fetch(&self, input: &FeedInput) -> Result<String>;
}

/// HTTP-backed feed source with local-file passthrough.
pub struct HttpFeedSource {
    client: Client,
    base_url: Url,
}

impl HttpFeedSource {
    /// Create a feed source against the default feed endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a feed source against a different origin (tests, mirrors).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TubedigestError::config(format!("invalid feed base url: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TubedigestError::FeedUnavailable(format!("client build: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// The feed URL for a channel id.
    fn feed_url(&self, channel_id: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join("/feeds/videos.xml")
            .map_err(|e| TubedigestError::FeedUnavailable(format!("feed url: {e}")))?;
        url.query_pairs_mut().append_pair("channel_id", channel_id);
        Ok(url)
    }

    async fn fetch_remote(&self, channel_id: &str) -> Result<String> {
        let url = self.feed_url(channel_id)?;
        debug!(%url, "fetching channel feed");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| TubedigestError::FeedUnavailable(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TubedigestError::FeedUnavailable(format!(
                "{url}: HTTP {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TubedigestError::FeedUnavailable(format!("{url}: body read failed: {e}")))
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    #[instrument(skip_all, fields(input = ?input))]
    async fn fetch(&self, input: &FeedInput) -> Result<String> {
        match input {
            FeedInput::ChannelId(id) => self.fetch_remote(id).await,
            FeedInput::LocalFile(path) => std::fs::read_to_string(path).map_err(|e| {
                TubedigestError::FeedUnavailable(format!("{}: {e}", path.display()))
            }),
        }
    }
}
