//! Transaction router client.
//!
//! The router is the cooperating process/service that executes or further
//! routes a built transaction. Readiness gating on `{router}/ping` is the
//! orchestrator's concern; this client only covers the route POST.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::{TransactionInfo, TransactionResult};
use crate::error::Result;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RouteAck {
    id: Option<String>,
}

pub struct RouterClient {
    base_url: String,
    http: Client,
}

impl RouterClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Forward one transaction to `POST {router}/route`.
    ///
    /// Best effort, at most once: a failure here is logged by the caller and
    /// never retried. The ack id is optional on the wire; a fresh UUID stands
    /// in when the router returns an empty body.
    pub async fn route(&self, transaction: &TransactionInfo) -> Result<TransactionResult> {
        let response = self
            .http
            .post(format!("{}/route", self.base_url))
            .json(transaction)
            .send()
            .await?
            .error_for_status()?;

        let id = match response.json::<RouteAck>().await {
            Ok(RouteAck { id: Some(id) }) => id,
            _ => uuid::Uuid::new_v4().to_string(),
        };

        debug!(%id, "Transaction routed");
        Ok(TransactionResult {
            id,
            time: chrono::Utc::now(),
        })
    }
}
