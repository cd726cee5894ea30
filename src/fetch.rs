use std::{collections::BTreeMap, future::Future, time::Duration};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::FetchError;

pub type Headers = BTreeMap<String, String>;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches one URL and hands back its body as text.
///
/// Implementations must give up after `timeout_ms`.
pub trait PageFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        headers: &Headers,
        timeout_ms: u64,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Headers of a desktop browser navigating to a page.
#[must_use]
pub fn browser_headers(user_agent: &str) -> Headers {
    [
        ("User-Agent", user_agent),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("DNT", "1"),
        ("Upgrade-Insecure-Requests", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("Cache-Control", "max-age=0"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// `PageFetcher` over a shared reqwest client.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

fn header_map(headers: &Headers) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        match (
            HeaderName::from_bytes(k.as_bytes()),
            HeaderValue::from_str(v),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!(header = %k, "skipping unusable header"),
        }
    }
    map
}

impl PageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: &Headers,
        timeout_ms: u64,
    ) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .headers(header_map(headers))
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| classify(url, timeout_ms, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(|e| classify(url, timeout_ms, &e))
    }
}

fn classify(url: &str, timeout_ms: u64, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_ms,
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
