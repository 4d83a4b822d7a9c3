//! Retrying HTTP client used to inform the peer service of new tickets and
//! messages.
//!
//! The two services may be reachable under different hostnames depending on
//! the deployment (loopback in development, service aliases under compose),
//! and there is no service discovery: the notifier walks a fixed, ordered
//! candidate list derived from the configured base URL.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time;

/// Attempts per candidate URL before moving to the next one.
pub const MAX_ATTEMPTS_PER_URL: u32 = 3;
/// Linear backoff unit between attempts on the same URL.
pub const BACKOFF_UNIT: Duration = Duration::from_millis(300);
/// Per-attempt request timeout.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
#[error("delivery failed after {urls} url(s) x {attempts} attempt(s): {last}")]
pub struct NotifyError {
    pub urls: usize,
    pub attempts: u32,
    pub last: String,
}

/// HTTP notifier for one peer service.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    host_aliases: Vec<(String, String)>,
}

impl Notifier {
    /// `host_aliases` is an ordered `(needle, replacement)` table; each entry
    /// that changes the base URL contributes one more candidate.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        host_aliases: Vec<(String, String)>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(ATTEMPT_TIMEOUT)
            .build()
            .expect("failed to build notifier http client");
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            host_aliases,
        }
    }

    /// The ordered, deduplicated candidate base URLs.
    pub fn candidate_urls(&self) -> Vec<String> {
        let mut urls = vec![self.base_url.clone()];
        for (needle, replacement) in &self.host_aliases {
            let alt = self.base_url.replace(needle.as_str(), replacement.as_str());
            if !urls.contains(&alt) {
                urls.push(alt);
            }
        }
        urls
    }

    /// Delivers `payload` as JSON to `path` on the peer.
    ///
    /// Candidates are tried in order with up to [`MAX_ATTEMPTS_PER_URL`]
    /// attempts each; the first 2xx ends the whole operation and returns the
    /// response body. Between attempts on the same URL the delay grows
    /// linearly (`attempt x BACKOFF_UNIT`). A non-2xx response or transport
    /// error counts as a failed attempt.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        headers: &[(&str, String)],
    ) -> Result<String, NotifyError> {
        let candidates = self.candidate_urls();
        let mut last = String::from("no attempt made");

        for base in &candidates {
            let endpoint = format!("{base}{path}");
            for attempt in 1..=MAX_ATTEMPTS_PER_URL {
                let mut req = self.client.post(&endpoint).json(payload);
                if !self.api_key.is_empty() {
                    req = req.bearer_auth(&self.api_key);
                }
                for (name, value) in headers {
                    req = req.header(*name, value);
                }

                match req.send().await {
                    Ok(resp) if resp.status().is_success() => {
                        tracing::info!("delivered to {endpoint} (attempt {attempt})");
                        return Ok(resp.text().await.unwrap_or_default());
                    }
                    Ok(resp) => {
                        last = format!("{endpoint}: status {}", resp.status());
                        tracing::warn!("attempt {attempt} failed: {last}");
                    }
                    Err(e) => {
                        last = format!("{endpoint}: {e}");
                        tracing::warn!("attempt {attempt} failed: {last}");
                    }
                }

                if attempt < MAX_ATTEMPTS_PER_URL {
                    time::sleep(BACKOFF_UNIT * attempt).await;
                }
            }
        }

        Err(NotifyError {
            urls: candidates.len(),
            attempts: MAX_ATTEMPTS_PER_URL,
            last,
        })
    }
}

/// Spawns a delivery as a detached task.
///
/// The triggering request never waits on this: the task's only observable
/// effects are logging and eventual convergence of the peer's store. Local
/// persistence is never rolled back on failure.
pub fn notify_detached<T>(notifier: Notifier, path: String, payload: T, headers: Vec<(&'static str, String)>)
where
    T: Serialize + Send + Sync + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = notifier.post(&path, &payload, &headers).await {
            tracing::error!("cross-service notification to {path} failed: {e}");
        }
    });
}
