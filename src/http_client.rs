use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("gridiron_forecast/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout of the first caller wins.
pub fn http_client(timeout_secs: u64) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): base, 2×base, 4×base, …
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

enum Attempt {
    Done(String),
    Retry(anyhow::Error),
    Fatal(anyhow::Error),
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn attempt_once(client: &Client, url: &str) -> Attempt {
    let resp = match client.get(url).send() {
        Ok(resp) => resp,
        Err(err) => return Attempt::Retry(anyhow!(err).context(format!("request {url}"))),
    };
    let status = resp.status();
    if is_retryable(status) {
        return Attempt::Retry(anyhow!("{url} returned {status}"));
    }
    if !status.is_success() {
        return Attempt::Fatal(anyhow!("{url} returned {status}"));
    }
    match resp.text() {
        Ok(body) => Attempt::Done(body),
        Err(err) => Attempt::Retry(anyhow!(err).context(format!("read body of {url}"))),
    }
}

/// GET `url` and return the body. Transport errors, 429 and 5xx are retried
/// with exponential backoff; any other non-success status fails at once.
pub fn fetch_text_with_retry(client: &Client, url: &str, policy: &RetryPolicy) -> Result<String> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = None;
    for attempt in 0..attempts {
        match attempt_once(client, url) {
            Attempt::Done(body) => {
                debug!(%url, attempt = attempt + 1, bytes = body.len(), "fetched");
                return Ok(body);
            }
            Attempt::Fatal(err) => return Err(err),
            Attempt::Retry(err) => {
                warn!(%url, attempt = attempt + 1, error = %err, "fetch failed");
                last_error = Some(err);
                if attempt + 1 < attempts {
                    thread::sleep(policy.delay(attempt));
                }
            }
        }
    }
    Err(last_error.unwrap_or_else(|| anyhow!("no attempts made for {url}")))
        .with_context(|| format!("giving up on {url} after {attempts} attempts"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let p = RetryPolicy {
            max_attempts: 4,
            base_delay_ms: 100,
        };
        assert_eq!(p.delay(0), Duration::from_millis(100));
        assert_eq!(p.delay(1), Duration::from_millis(200));
        assert_eq!(p.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn retries_only_throttling_and_server_errors() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
        assert!(!is_retryable(StatusCode::OK));
    }
}
