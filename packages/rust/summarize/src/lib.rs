//! Text summarization via an OpenAI-compatible chat-completions API.
//!
//! The orchestrator only sees the [`Summarizer`] capability; the concrete
//! client here is swappable for any endpoint speaking the same protocol
//! (set `[openai] base_url` in the config).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use tubedigest_shared::{Result, TubedigestError};

/// Default timeout in seconds for summarization requests. Generous: long
/// transcripts take a while to process upstream.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// User-Agent string for summarization requests.
const USER_AGENT: &str = concat!("tubedigest/", env!("CARGO_PKG_VERSION"));

/// Instruction prepended to every summarization request.
const PROMPT_PREFIX: &str = "Summarize the following transcript:\n";

// ---------------------------------------------------------------------------
// Summarizer
// ---------------------------------------------------------------------------

/// Capability interface for turning a long text into a short summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text`, returning the summary body.
    async fn summarize(&self, text: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// OpenAiSummarizer
// ---------------------------------------------------------------------------

/// Chat-completions-backed [`Summarizer`].
pub struct OpenAiSummarizer {
    client: Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    /// Create a summarizer for the given endpoint, key, and model.
    ///
    /// The key is held for the lifetime of this value only; nothing is
    /// written to ambient process state.
    pub fn new(base_url: &str, api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TubedigestError::config(format!("invalid openai base url: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TubedigestError::Summarize(format!("client build: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn completions_url(&self) -> Result<Url> {
        self.base_url
            .join("/v1/chat/completions")
            .map_err(|e| TubedigestError::Summarize(format!("completions url: {e}")))
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    #[instrument(skip_all, fields(model = %self.model, chars = text.len()))]
    async fn summarize(&self, text: &str) -> Result<String> {
        let url = self.completions_url()?;
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: format!("{PROMPT_PREFIX}{text}"),
            }],
        };

        debug!(%url, "requesting summary");

        let response = self
            .client
            .post(url.as_str())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TubedigestError::Summarize(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TubedigestError::Summarize(format!(
                "HTTP {status}: {}",
                body.trim()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| TubedigestError::Summarize(format!("bad response shape: {e}")))?;

        let summary = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TubedigestError::Summarize("response has no choices".into()))?;

        Ok(summary)
    }
}
