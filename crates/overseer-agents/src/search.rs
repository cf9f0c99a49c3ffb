//! Web-search agent.
//!
//! Tries each configured [`RetrievalBackend`] in turn and answers with the
//! first usable snippet. When every source fails the answer is
//! [`SEARCH_FAILED`].

use std::ops::RangeInclusive;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use tracing::{debug, warn};

use crate::adapter::Agent;
use crate::error::{clip, BackendError};

/// Sentinel answer when no source produced a snippet.
pub const SEARCH_FAILED: &str = "Search failed.";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// A source of free-text snippets for a query.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Short label for logs.
    fn source(&self) -> &str;

    async fn fetch(&self, query: &str) -> Result<String, BackendError>;
}

/// Timing knobs for [`WebSearchAgent`].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Bound on each individual source.
    pub timeout: Duration,
    /// Random pause between sources, in milliseconds.
    pub backoff_ms: RangeInclusive<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            backoff_ms: 1_000..=2_000,
        }
    }
}

/// Agent answering from web retrieval.
pub struct WebSearchAgent {
    name: String,
    sources: Vec<Arc<dyn RetrievalBackend>>,
    config: SearchConfig,
}

impl WebSearchAgent {
    /// Agent that queries `sources` in order until one yields text.
    pub fn new(sources: Vec<Arc<dyn RetrievalBackend>>, config: SearchConfig) -> Self {
        Self {
            name: "WebSearchAgent".to_string(),
            sources,
            config,
        }
    }

    /// Bing then DuckDuckGo over HTTP.
    pub fn with_default_sources(config: SearchConfig) -> Result<Self, BackendError> {
        let sources: Vec<Arc<dyn RetrievalBackend>> = vec![
            Arc::new(HttpSearchBackend::bing(config.timeout)?),
            Arc::new(HttpSearchBackend::duckduckgo(config.timeout)?),
        ];
        Ok(Self::new(sources, config))
    }

    async fn pause_between_sources(&self) {
        let (lo, hi) = (*self.config.backoff_ms.start(), *self.config.backoff_ms.end());
        if hi == 0 {
            return;
        }
        let ms = rand::thread_rng().gen_range(lo.min(hi)..=hi);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[async_trait]
impl Agent for WebSearchAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, prompt: &str) -> String {
        for (idx, source) in self.sources.iter().enumerate() {
            if idx > 0 {
                self.pause_between_sources().await;
            }
            let fetch = tokio::time::timeout(self.config.timeout, source.fetch(prompt));
            let outcome = match fetch.await {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout(self.config.timeout)),
            };
            match outcome {
                Ok(snippet) if !snippet.trim().is_empty() => {
                    debug!(source = source.source(), "search source answered");
                    return snippet.trim().to_string();
                }
                Ok(_) => warn!(source = source.source(), "search source returned empty snippet"),
                Err(e) => warn!(source = source.source(), error = %e, "search source failed"),
            }
        }
        SEARCH_FAILED.to_string()
    }
}

/// HTML search page scraper: GET `<base_url>?<param>=<query>` and return the
/// first non-empty paragraph.
pub struct HttpSearchBackend {
    label: String,
    base_url: String,
    query_param: String,
    http_client: reqwest::Client,
}

impl HttpSearchBackend {
    /// Backend issuing `GET {base_url}?{query_param}=<query>` with a browser
    /// user agent.
    pub fn new(
        label: &str,
        base_url: &str,
        query_param: &str,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(HttpSearchBackend {
            label: label.to_string(),
            base_url: base_url.to_string(),
            query_param: query_param.to_string(),
            http_client,
        })
    }

    /// Bing HTML search.
    pub fn bing(timeout: Duration) -> Result<Self, BackendError> {
        Self::new("bing", "https://www.bing.com/search", "q", timeout)
    }

    /// DuckDuckGo HTML search.
    pub fn duckduckgo(timeout: Duration) -> Result<Self, BackendError> {
        Self::new("duckduckgo", "https://duckduckgo.com/html/", "q", timeout)
    }
}

#[async_trait]
impl RetrievalBackend for HttpSearchBackend {
    fn source(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, query: &str) -> Result<String, BackendError> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[(self.query_param.as_str(), query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: clip(&body, 200),
            });
        }

        let html = response.text().await?;
        first_paragraph(&html).ok_or(BackendError::NoResults)
    }
}

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").expect("paragraph pattern"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"))
}

/// Text of the first `<p>` element with visible content.
pub fn first_paragraph(html: &str) -> Option<String> {
    paragraph_re().captures_iter(html).find_map(|caps| {
        let inner = tag_re().replace_all(&caps[1], "");
        let text = decode_entities(&inner)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        (!text.is_empty()).then_some(text)
    })
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
