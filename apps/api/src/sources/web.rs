//! Portfolio / arbitrary-link adapter: fetch a page and reduce it to visible text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use scraper::Html;
use tracing::{debug, warn};

use super::Source;

const FETCH_TIMEOUT_SECS: u64 = 10;
const MAX_ATTEMPTS: u32 = 3;
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Elements whose text never reaches the model.
const SKIPPED_TAGS: [&str; 7] = ["script", "style", "meta", "noscript", "header", "footer", "nav"];

#[derive(Clone)]
pub struct WebPageFetcher {
    client: Client,
    backoff_base: Duration,
}

impl WebPageFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .user_agent(BROWSER_USER_AGENT)
                .default_headers(headers)
                .build()?,
            backoff_base: Duration::from_secs(1),
        })
    }

    /// One GET; `None` on any transport error or non-200 status.
    async fn fetch_html(&self, url: &str) -> Option<String> {
        match self.client.get(url).send().await {
            Ok(response) if response.status() == StatusCode::OK => match response.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!("Reading body of {url} failed: {e}");
                    None
                }
            },
            Ok(response) => {
                warn!("{url} returned {}", response.status());
                None
            }
            Err(e) => {
                warn!("Fetching {url} failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl Source<String> for WebPageFetcher {
    async fn fetch(&self, locator: &str) -> Option<String> {
        let url = locator.trim();
        if url.is_empty() {
            return None;
        }

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // 1s, 2s
                let delay = self.backoff_base * (1 << (attempt - 1));
                debug!("Retrying {url} in {}ms", delay.as_millis());
                tokio::time::sleep(delay).await;
            }

            if let Some(html) = self.fetch_html(url).await {
                let text = extract_visible_text(&html);
                return (!text.is_empty()).then_some(text);
            }
        }

        warn!("Giving up on {url} after {MAX_ATTEMPTS} attempts");
        None
    }
}

/// Text content of the page minus scripts, styles and navigation chrome,
/// with all whitespace runs collapsed to single spaces.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_TAGS.contains(&element.name()))
        });
        if !hidden {
            raw.push_str(text);
            raw.push(' ');
        }
    }

    collapse_whitespace(&raw)
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim().to_string()
}
