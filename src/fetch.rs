//! Page fetcher: HTTP GET with timeout, status classification and retry.
//!
//! Uses `ureq` for synchronous HTTP requests. 429 and 403 responses and
//! transport failures are retried under the [`RetryPolicy`]; every other
//! non-2xx status is terminal for that URL. Redirects are followed, and the
//! URL the body was finally served from is reported with it.

use std::io::Read;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::retry::RetryPolicy;

/// Result type for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Bodies larger than this are rejected rather than buffered.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// A response body and the URL it was served from after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

impl FetchedPage {
    /// A body served directly from the requested URL.
    pub fn direct(url: &str, body: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            body: body.into(),
        }
    }
}

/// Anything that can turn an absolute URL into a response body.
///
/// The crawler only depends on this trait, so tests can serve a site from memory.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;
}

/// Classify an HTTP status code. `None` means success.
pub fn classify_status(url: &str, status: u16) -> Option<FetchError> {
    match status {
        200..=299 => None,
        429 | 403 => Some(FetchError::Throttled {
            url: url.to_string(),
            status,
        }),
        _ => Some(FetchError::Status {
            url: url.to_string(),
            status,
        }),
    }
}

/// Blocking HTTP fetcher backed by a shared `ureq::Agent`.
pub struct HttpFetcher {
    agent: ureq::Agent,
    retry: RetryPolicy,
    max_body_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher with the given per-request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self {
            agent,
            retry: RetryPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the response body size cap.
    pub fn with_max_body_bytes(mut self, limit: u64) -> Self {
        self.max_body_bytes = limit;
        self
    }

    fn read_body(&self, url: &str, response: ureq::Response) -> FetchResult<String> {
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_body_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        if bytes.len() as u64 > self.max_body_bytes {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_body_bytes,
            });
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn fetch_once(&self, url: &str) -> FetchResult<FetchedPage> {
        match self.agent.get(url).call() {
            Ok(response) => {
                if let Some(err) = classify_status(url, response.status()) {
                    return Err(err);
                }
                let served = response.get_url().to_string();
                let body = self.read_body(url, response)?;
                Ok(FetchedPage { url: served, body })
            }
            Err(ureq::Error::Status(code, _)) => Err(classify_status(url, code).unwrap_or(
                FetchError::Status {
                    url: url.to_string(),
                    status: code,
                },
            )),
            Err(ureq::Error::Transport(transport)) => Err(FetchError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        debug!(%url, "fetching");
        self.retry
            .run(
                url,
                |attempt| {
                    let result = self.fetch_once(url);
                    if let Err(FetchError::Throttled { status, .. }) = &result {
                        warn!(%url, status, attempt, "throttled");
                    }
                    result
                },
                FetchError::is_retryable,
            )
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("retry", &self.retry)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
