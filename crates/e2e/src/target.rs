//! Target app reachability - the deck is served externally, we only probe it

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Environment variable overriding the deck's base URL
pub const BASE_URL_ENV: &str = "BASE_URL";

pub const DEFAULT_BASE_URL: &str = "http://192.168.100.4:8080";

/// Base URL from the environment, falling back to the default
pub fn base_url_from_env() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Configuration for probing the deck before a run
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub base_url: String,

    /// Total time allowed for the app to answer
    pub probe_timeout: Duration,

    /// Delay between attempts
    pub probe_interval: Duration,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            probe_timeout: Duration::from_secs(30),
            probe_interval: Duration::from_millis(250),
            request_timeout: Duration::from_secs(2),
        }
    }
}

/// A deck instance that answered the probe
#[derive(Debug, Clone)]
pub struct TargetApp {
    pub base_url: String,
    pub attempts: usize,
}

impl TargetApp {
    /// Poll the base URL until it answers with a success status
    pub async fn probe(config: &TargetConfig) -> E2eResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;

            match client.get(&config.base_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!("Target app is up at {} ({} attempt(s))", config.base_url, attempts);
                    return Ok(TargetApp {
                        base_url: config.base_url.clone(),
                        attempts,
                    });
                }
                Ok(resp) => {
                    warn!("Target app returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for target app at {}...", config.base_url);
                    }
                    // Connection refused is expected while the app is starting
                    if !e.is_connect() {
                        warn!("Probe error: {}", e);
                    }
                }
            }

            if start.elapsed() + config.probe_interval >= config.probe_timeout {
                break;
            }
            sleep(config.probe_interval).await;
        }

        Err(E2eError::TargetUnreachable {
            url: config.base_url.clone(),
            attempts,
        })
    }
}
