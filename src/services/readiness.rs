//! Readiness gate for a cooperating service.
//!
//! Polls a URL until it answers 2xx or an overall deadline elapses. The
//! polling future lives inside the deadline race and is dropped the moment
//! the race resolves, so no probe keeps running after the gate returns.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Overall deadline and per-attempt retry spacing for one gate wait.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessTimeouts {
    pub overall: Duration,
    pub retry: Duration,
}

impl Default for ReadinessTimeouts {
    fn default() -> Self {
        // Matches the router bring-up budget: 30s overall, probing every 500ms.
        Self {
            overall: Duration::from_secs(30),
            retry: Duration::from_millis(500),
        }
    }
}

pub struct ReadinessGate {
    http: Client,
}

impl ReadinessGate {
    pub fn new() -> Result<Self> {
        // Per-probe timeout stays under the retry interval's order of
        // magnitude so a black-holed target cannot absorb the whole deadline.
        let http = Client::builder().timeout(Duration::from_secs(2)).build()?;
        Ok(Self { http })
    }

    /// Wait until `url` answers 2xx, or give up at the overall deadline.
    ///
    /// Returns `true` only if a success arrives strictly before the deadline;
    /// a timeout is `false`, not an error.
    pub async fn wait_ready(&self, url: &str, timeouts: ReadinessTimeouts) -> bool {
        let probe = async {
            let mut attempts = 0u32;
            loop {
                attempts += 1;
                match self.http.get(url).send().await {
                    Ok(response) if response.status().is_success() => {
                        debug!(url, attempts, "Readiness probe succeeded");
                        break;
                    }
                    Ok(response) => {
                        debug!(url, status = %response.status(), "Readiness probe refused");
                    }
                    Err(e) => {
                        debug!(url, "Readiness probe failed: {e}");
                    }
                }
                tokio::time::sleep(timeouts.retry).await;
            }
        };

        match tokio::time::timeout(timeouts.overall, probe).await {
            Ok(()) => {
                info!(url, "Dependent service is ready");
                true
            }
            Err(_) => {
                warn!(
                    url,
                    waited_ms = timeouts.overall.as_millis(),
                    "Dependent service never became ready"
                );
                false
            }
        }
    }
}
