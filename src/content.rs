//! Reference-page fetching and excerpt extraction.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetcherError;
use crate::html::{decode_body, first_paragraph};

/// Reference site articles are resolved against by default.
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
/// Excerpt text shown when the page could not be retrieved.
pub const UNAVAILABLE_MARKER: &str = "⚠️ Wikipedia page not found.";
const USER_AGENT: &str = concat!(
    "wikisim/",
    env!("CARGO_PKG_VERSION"),
    " (article recommendations; reqwest)"
);
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for [`ContentFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Scheme and host articles live under, e.g. `https://en.wikipedia.org`.
    pub base_url: String,
    /// Bound on the whole request, body included.
    pub timeout: Duration,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// How an excerpt was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcerptStatus {
    /// A non-empty paragraph was extracted.
    Found,
    /// The page loaded but held no non-empty paragraph.
    Empty,
    /// The request failed or returned a non-success status.
    Unavailable,
}

/// Excerpt of a reference page plus the URL it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentExcerpt {
    /// Page URL, built even when the fetch failed.
    pub source_url: String,
    /// First non-empty paragraph, empty, or [`UNAVAILABLE_MARKER`].
    pub text: String,
    /// Outcome of the fetch.
    pub status: ExcerptStatus,
}

impl ContentExcerpt {
    fn unavailable(source_url: String) -> Self {
        Self {
            source_url,
            text: UNAVAILABLE_MARKER.to_string(),
            status: ExcerptStatus::Unavailable,
        }
    }
}

/// Fetches reference pages and extracts their lead paragraph.
///
/// Every call issues exactly one GET; nothing is cached or retried.
#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
    base_url: String,
}

impl ContentFetcher {
    /// Builds a fetcher from `config`.
    pub fn new(config: FetcherConfig) -> Result<Self, FetcherError> {
        let base_url = validate_base(&config.base_url)?;
        let client = Client::builder()
            .user_agent(config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL titles are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page URL for `title`: spaces become underscores, nothing else changes.
    pub fn resolve_url(&self, title: &str) -> String {
        article_url(&self.base_url, title)
    }

    /// Fetches the page for `title` and extracts its first non-empty paragraph.
    pub async fn fetch(&self, title: &str) -> ContentExcerpt {
        let url = self.resolve_url(title);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %url, error = %err, "reference page request failed");
                return ContentExcerpt::unavailable(url);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "reference page unavailable");
            return ContentExcerpt::unavailable(url);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %url, error = %err, "failed to read reference page body");
                return ContentExcerpt::unavailable(url);
            }
        };

        match first_paragraph(&decode_body(&body)) {
            Some(text) => ContentExcerpt {
                source_url: url,
                text,
                status: ExcerptStatus::Found,
            },
            None => {
                debug!(url = %url, "reference page has no non-empty paragraph");
                ContentExcerpt {
                    source_url: url,
                    text: String::new(),
                    status: ExcerptStatus::Empty,
                }
            }
        }
    }
}

/// Page URL for `title` under `base_url`.
pub fn article_url(base_url: &str, title: &str) -> String {
    format!(
        "{}/wiki/{}",
        base_url.trim_end_matches('/'),
        title.replace(' ', "_")
    )
}

fn validate_base(raw: &str) -> Result<String, FetcherError> {
    let parsed = Url::parse(raw).map_err(|_| FetcherError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(FetcherError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_wikipedia_article_urls() {
        let fetcher = ContentFetcher::new(FetcherConfig::default()).expect("fetcher");
        assert_eq!(
            fetcher.resolve_url("Ada Lovelace"),
            "https://en.wikipedia.org/wiki/Ada_Lovelace"
        );
        assert_eq!(
            fetcher.resolve_url("Ada Lovelace"),
            fetcher.resolve_url("Ada Lovelace")
        );
    }

    #[test]
    fn resolve_leaves_other_characters_alone() {
        assert_eq!(
            article_url("https://en.wikipedia.org/", "C (programming language)"),
            "https://en.wikipedia.org/wiki/C_(programming_language)"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        let config = FetcherConfig {
            base_url: "ftp://example.com".to_string(),
            ..FetcherConfig::default()
        };
        assert!(matches!(
            ContentFetcher::new(config),
            Err(FetcherError::InvalidBaseUrl(_))
        ));
        assert!(validate_base("not a url").is_err());
    }

    #[test]
    fn trims_trailing_slash_from_base() {
        assert_eq!(
            validate_base("http://127.0.0.1:8080/").expect("valid"),
            "http://127.0.0.1:8080"
        );
    }
}
