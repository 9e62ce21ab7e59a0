//! HTTP download of remote modules
//!
//! Redirects are followed by hand so the terminal response's headers
//! and URL can be captured for the cache, and so the hop limit applies
//! to the whole chain rather than per request.

use crate::cache::HeaderSet;
use crate::error::{RemodError, RemodResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use ureq::Agent;
use url::Url;

/// Network limits and identification for outgoing requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Overall timeout per request in seconds
    pub timeout_secs: u64,

    /// Redirect hops to follow before giving up
    pub max_redirects: u32,

    /// Largest response body accepted, in megabytes
    pub max_size_mb: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 10,
            max_size_mb: 50,
            user_agent: default_user_agent(),
        }
    }
}

impl FetchOptions {
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }
}

fn default_user_agent() -> String {
    format!("remod/{}", env!("CARGO_PKG_VERSION"))
}

/// A downloaded module: the URL that finally answered, its body, and
/// the terminal response's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedModule {
    pub url: Url,
    pub contents: String,
    pub headers: HeaderSet,
}

/// Downloads module sources over HTTP(S).
#[derive(Clone)]
pub struct RemoteFetcher {
    agent: Agent,
    max_redirects: u32,
    max_size: u64,
}

impl RemoteFetcher {
    pub fn new(options: &FetchOptions) -> Self {
        // Redirects are handled in fetch_blocking, not by the agent.
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_global(Some(Duration::from_secs(options.timeout_secs)))
            .user_agent(options.user_agent.as_str())
            .build();

        Self {
            agent: Agent::new_with_config(config),
            max_redirects: options.max_redirects,
            max_size: options.max_size_bytes(),
        }
    }

    /// Download a module, following up to the configured number of
    /// redirect hops. Runs the blocking client off the async runtime.
    pub async fn fetch(&self, url: &Url) -> RemodResult<FetchedModule> {
        let fetcher = self.clone();
        let url = url.clone();
        tokio::task::spawn_blocking(move || fetcher.fetch_blocking(&url))
            .await
            .map_err(|e| RemodError::Internal(format!("fetch task failed: {e}")))?
    }

    pub fn fetch_blocking(&self, url: &Url) -> RemodResult<FetchedModule> {
        let mut current = url.clone();

        for _ in 0..=self.max_redirects {
            if current.scheme() == "http" {
                debug!("Fetching over unencrypted http: {}", current);
            }
            info!("Downloading {}", current);

            let mut response = self
                .agent
                .get(current.as_str())
                .call()
                .map_err(|e| transport_error(&current, e, self.max_size))?;

            let status = response.status();
            if matches!(status.as_u16(), 301 | 302 | 307) {
                let location = response
                    .headers()
                    .get("location")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
                    .ok_or_else(|| RemodError::RedirectMissingLocation {
                        url: current.to_string(),
                    })?;
                let next = current
                    .join(&location)
                    .map_err(|e| RemodError::invalid_url(&location, e))?;
                debug!("Redirected {} -> {}", current, next);
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(RemodError::FetchStatus {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            // Repeated header lines fold into one comma-joined value.
            let mut headers = HeaderSet::new();
            for (name, value) in response.headers() {
                headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
            }

            let contents = response
                .body_mut()
                .with_config()
                .limit(self.max_size)
                .read_to_string()
                .map_err(|e| transport_error(&current, e, self.max_size))?;

            return Ok(FetchedModule {
                url: current,
                contents,
                headers,
            });
        }

        Err(RemodError::RedirectLoop {
            url: url.to_string(),
            limit: self.max_redirects,
        })
    }
}

fn transport_error(url: &Url, error: ureq::Error, limit: u64) -> RemodError {
    match error {
        ureq::Error::BodyExceedsLimit(_) => RemodError::ContentTooLarge {
            url: url.to_string(),
            limit,
        },
        other => RemodError::FetchTransport {
            url: url.to_string(),
            source: Box::new(other),
        },
    }
}
