use crate::config::WatchConfig;
use crate::parser::{ParseError, parse_listing};
use crate::session::SessionContext;
use crate::types::Item;

use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// Headers of a desktop Chrome navigation request.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("cache-control", "max-age=0"),
    ("dnt", "1"),
    ("priority", "u=0, i"),
    ("sec-ch-ua", "\"Not=A?Brand\";v=\"24\", \"Chromium\";v=\"140\""),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"macOS\""),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
];

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

fn browser_headers() -> HeaderMap {
    BROWSER_HEADERS
        .iter()
        .map(|&(name, value)| {
            (
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    url: String,
    origin: String,
}

impl WebScraper {
    pub fn new(config: &WatchConfig) -> Result<Self, ScraperError> {
        Self::with_timeout(&config.url, &config.origin, config.timeout)
    }

    pub fn with_timeout(url: &str, origin: &str, timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            origin: origin.to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Raw dashboard markup. Non-2xx responses are errors.
    pub async fn fetch_dashboard(&self, session: &SessionContext) -> Result<String, ScraperError> {
        log::info!("Fetching dashboard from {}...", self.url);
        Ok(self
            .client
            .get(&self.url)
            .header(header::COOKIE, session.cookie_header())
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }

    pub async fn fetch_items(&self, session: &SessionContext) -> Result<Vec<Item>, ScraperError> {
        let html = self.fetch_dashboard(session).await?;
        Ok(parse_listing(&html, &self.origin)?)
    }
}
