use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{StatusCode, Url};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::AppConfig;

const PUBLIC_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://checkip.amazonaws.com",
];

/// Result of fetching one page. Failures are values so a bad page can be
/// skipped without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(String),
    /// Access denied or throttled on every attempt.
    Blocked { status: u16 },
    Failed { reason: String },
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Fetched(body) => write!(f, "fetched {} bytes", body.len()),
            FetchOutcome::Blocked { status } => write!(f, "blocked (HTTP {})", status),
            FetchOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// What to do after a response with a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusAction {
    Accept,
    Retry,
    GiveUp,
}

fn classify(status: StatusCode) -> StatusAction {
    match status.as_u16() {
        200 => StatusAction::Accept,
        403 | 429 | 503 => StatusAction::Retry,
        _ => StatusAction::GiveUp,
    }
}

/// The desktop `www.hibrain.net` site blocks scripted clients more eagerly
/// than the mobile one, so listings are always fetched from `m.hibrain.net`.
pub fn prefer_mobile(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.host_str() == Some("www.hibrain.net") => {
            if parsed.set_host(Some("m.hibrain.net")).is_ok() {
                parsed.to_string()
            } else {
                url.to_string()
            }
        }
        _ => url.to_string(),
    }
}

fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Origin a configured address will actually be fetched from, after the
/// mobile rewrite. Unparseable addresses are their own key.
pub fn origin_key(url: &str) -> String {
    let url = prefer_mobile(url);
    match Url::parse(&url) {
        Ok(parsed) => origin_of(&parsed),
        Err(_) => url,
    }
}

pub struct PageFetcher {
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
    /// Origins whose root page was already requested this run.
    warmed: Mutex<HashSet<String>>,
}

impl PageFetcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            warmed: Mutex::new(HashSet::new()),
        })
    }

    /// Fetch a page body, retrying transient failures. Never errors.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let url = prefer_mobile(url);
        let parsed = match Url::parse(&url) {
            Ok(u) => u,
            Err(e) => {
                return FetchOutcome::Failed {
                    reason: format!("invalid URL: {}", e),
                }
            }
        };
        let origin = origin_of(&parsed);
        self.warm_up(&origin).await;

        let mut last: FetchOutcome = FetchOutcome::Failed {
            reason: "no attempt made".to_string(),
        };

        for attempt in 1..=self.max_retries {
            let delay = self.retry_delay * attempt;
            info!(url = %url, attempt, max = self.max_retries, delay_ms = delay.as_millis() as u64, "Waiting before request");
            tokio::time::sleep(delay).await;

            let resp = self
                .client
                .get(parsed.clone())
                .header("Referer", format!("{}/recruitment", origin))
                .header("Origin", origin.as_str())
                .header("Upgrade-Insecure-Requests", "1")
                .header("Sec-Fetch-Site", "same-origin")
                .header("Sec-Fetch-Mode", "navigate")
                .header("Sec-Fetch-Dest", "document")
                .header("Sec-Fetch-User", "?1")
                .send()
                .await;

            let resp = match resp {
                Ok(r) => r,
                Err(e) => {
                    warn!(url = %url, attempt, error = %e, "Network error");
                    last = FetchOutcome::Failed {
                        reason: e.to_string(),
                    };
                    continue;
                }
            };

            let status = resp.status();
            match classify(status) {
                StatusAction::Accept => match resp.text().await {
                    Ok(body) => {
                        info!(url = %url, size = body.len(), "Page fetched");
                        return FetchOutcome::Fetched(body);
                    }
                    Err(e) => {
                        warn!(url = %url, attempt, error = %e, "Failed to read body");
                        last = FetchOutcome::Failed {
                            reason: format!("failed to read body: {}", e),
                        };
                    }
                },
                StatusAction::Retry => {
                    warn!(url = %url, attempt, status = status.as_u16(), "Blocked or throttled, retrying");
                    last = FetchOutcome::Blocked {
                        status: status.as_u16(),
                    };
                }
                StatusAction::GiveUp => {
                    warn!(url = %url, status = status.as_u16(), "Unexpected status, giving up");
                    return FetchOutcome::Failed {
                        reason: format!("unexpected HTTP status {}", status.as_u16()),
                    };
                }
            }
        }

        warn!(url = %url, outcome = %last, "Giving up after retries");
        last
    }

    /// Request the origin root once per run to pick up session cookies.
    /// The set is only locked to claim the origin, not across the request.
    async fn warm_up(&self, origin: &str) {
        if !self.warmed.lock().await.insert(origin.to_string()) {
            return;
        }
        match self.client.get(origin).send().await {
            Ok(resp) => debug!(origin, status = resp.status().as_u16(), "Warm-up done"),
            Err(e) => warn!(origin, error = %e, "Warm-up failed"),
        }
    }

    /// Public IP of this runner, for notices. `None` if every service fails.
    pub async fn public_ip(&self) -> Option<String> {
        for service in PUBLIC_IP_SERVICES {
            let resp = self
                .client
                .get(*service)
                .timeout(Duration::from_secs(5))
                .send()
                .await;
            let Ok(resp) = resp else {
                continue;
            };
            if !resp.status().is_success() {
                continue;
            }
            if let Ok(text) = resp.text().await {
                let ip = text.trim();
                if !ip.is_empty() && ip.len() < 64 {
                    return Some(ip.to_string());
                }
            }
        }
        None
    }
}
