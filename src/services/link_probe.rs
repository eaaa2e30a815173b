use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use reqwest::{Client, Method, StatusCode, Url};
use tokio::sync::Semaphore;

use crate::utils::logging::{log_probe_result, log_timeout};

/// Substrings of host+path that mark a link as a stand-in for a missing one.
pub const PLACEHOLDER_PATTERNS: &[&str] = &["no.link", "nolink", "no-link", "no_link", "emptylink"];

pub const PLACEHOLDER_REASON: &str = "Placeholder link";
pub const TIMEOUT_REASON: &str = "TimeoutError";

const USER_AGENT: &str = "LinkBot/1.0";

/// Result of checking one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub alive: bool,
    /// `HTTP <code>`, `TimeoutError`, `Placeholder link` or a transport error class.
    pub reason: String,
}

impl ProbeOutcome {
    fn alive(reason: impl Into<String>) -> Self {
        Self { alive: true, reason: reason.into() }
    }

    fn dead(reason: impl Into<String>) -> Self {
        Self { alive: false, reason: reason.into() }
    }
}

/// One checked item, paired with the outcome of probing its URL.
#[derive(Debug, Clone)]
pub struct ProbeReport<T> {
    pub item: T,
    pub outcome: ProbeOutcome,
}

/// Issues HEAD/GET health checks with a cap on requests in flight.
#[derive(Clone)]
pub struct LinkProber {
    client: Client,
    limit: Arc<Semaphore>,
    timeout: Duration,
}

impl LinkProber {
    pub fn new(concurrency: usize, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        let concurrency = concurrency.max(1);
        Ok(Self {
            client,
            limit: Arc::new(Semaphore::new(concurrency)),
            timeout,
        })
    }

    /// Probes every item's URL and returns the reports in input order.
    ///
    /// Placeholder links are judged without touching the network. Every item
    /// produces a report, whatever happens to its request.
    pub async fn check_all<T, F>(&self, items: Vec<T>, url_of: F) -> Vec<ProbeReport<T>>
    where
        F: Fn(&T) -> &str,
    {
        let probes = items.into_iter().map(|item| {
            let url = url_of(&item).to_string();
            async move {
                let outcome = self.check(&url).await;
                ProbeReport { item, outcome }
            }
        });
        join_all(probes).await
    }

    /// Probes one URL, waiting for a free slot first.
    pub async fn check(&self, url: &str) -> ProbeOutcome {
        if is_placeholder_link(url) {
            log_probe_result(url, false, PLACEHOLDER_REASON);
            return ProbeOutcome::dead(PLACEHOLDER_REASON);
        }

        let outcome = match self.limit.acquire().await {
            Ok(_permit) => self.probe(url.trim()).await,
            Err(_) => ProbeOutcome::dead("Cancelled"),
        };
        log_probe_result(url, outcome.alive, &outcome.reason);
        outcome
    }

    /// HEAD first; 403, 405 and timeouts fall back to GET. Two rounds when both time out.
    async fn probe(&self, url: &str) -> ProbeOutcome {
        for _ in 0..2 {
            let mut outcome = self.request_once(url, Method::HEAD).await;
            if outcome.alive {
                return outcome;
            }
            if needs_get_fallback(&outcome.reason) {
                let via_get = self.request_once(url, Method::GET).await;
                if via_get.alive {
                    return via_get;
                }
                outcome = via_get;
            }
            if outcome.reason != TIMEOUT_REASON {
                return outcome;
            }
            log_timeout("link probe", self.timeout.as_secs(), Some(url));
        }
        ProbeOutcome::dead(TIMEOUT_REASON)
    }

    async fn request_once(&self, url: &str, method: Method) -> ProbeOutcome {
        match self.client.request(method, url).send().await {
            Ok(response) => classify_status(response.status()),
            Err(err) => ProbeOutcome::dead(error_reason(&err)),
        }
    }
}

fn needs_get_fallback(reason: &str) -> bool {
    reason == TIMEOUT_REASON || reason == "HTTP 403" || reason == "HTTP 405"
}

fn classify_status(status: StatusCode) -> ProbeOutcome {
    let reason = format!("HTTP {}", status.as_u16());
    if status.as_u16() >= 400 {
        ProbeOutcome::dead(reason)
    } else {
        ProbeOutcome::alive(reason)
    }
}

fn error_reason(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        TIMEOUT_REASON
    } else if err.is_connect() {
        "ConnectError"
    } else if err.is_redirect() {
        "RedirectError"
    } else if err.is_builder() {
        "InvalidURL"
    } else {
        "RequestError"
    }
}

/// Checks the lowercase host and path of `url` for placeholder markers.
pub fn is_placeholder_link(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    let target = format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()).to_lowercase();
    PLACEHOLDER_PATTERNS.iter().any(|pattern| target.contains(pattern))
}
