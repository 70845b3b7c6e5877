//! Signal service client.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::{AlgorithmSignal, Pair};
use crate::error::Result;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of per-algorithm signals for one pair and polling interval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Fetch the current algorithm-name → signal mapping.
    ///
    /// A non-2xx status or a malformed body is an error; there is no retry.
    async fn fetch(&self, pair: &Pair, interval: i32) -> Result<HashMap<String, AlgorithmSignal>>;
}

/// HTTP client for the signal-generation service.
pub struct HttpSignalClient {
    base_url: String,
    http: Client,
}

impl HttpSignalClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl SignalSource for HttpSignalClient {
    async fn fetch(&self, pair: &Pair, interval: i32) -> Result<HashMap<String, AlgorithmSignal>> {
        let signals: HashMap<String, AlgorithmSignal> = self
            .http
            .get(format!("{}/signals", self.base_url))
            .query(&[("pair", pair.to_string()), ("interval", interval.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(%pair, interval, count = signals.len(), "Fetched signals");
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coin, TradeType};
    use axum::routing::get;
    use axum::Router;
    use rust_decimal_macros::dec;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetch_decodes_the_signal_map() {
        let app = Router::new().route(
            "/signals",
            get(|| async {
                axum::Json(serde_json::json!({
                    "macd_cross": {"algorithm": "macd_cross", "amount": 15.0, "signal": "buy"},
                    "rsi_dip": {"algorithm": "rsi_dip", "amount": 3.5, "signal": "no_action"}
                }))
            }),
        );
        let base = serve(app).await;

        let client = HttpSignalClient::new(&base).unwrap();
        let pair = Pair::new(Coin::new("BTC"), Coin::new("USD"));
        let signals = client.fetch(&pair, 60).await.unwrap();

        assert_eq!(signals.len(), 2);
        assert_eq!(signals["macd_cross"].signal, TradeType::Buy);
        assert_eq!(signals["macd_cross"].amount, dec!(15));
        assert_eq!(signals["rsi_dip"].signal, TradeType::NoAction);
    }

    #[tokio::test]
    async fn fetch_fails_on_non_2xx() {
        let app = Router::new().route(
            "/signals",
            get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(app).await;

        let client = HttpSignalClient::new(&base).unwrap();
        let pair = Pair::new(Coin::new("BTC"), Coin::new("USD"));
        assert!(client.fetch(&pair, 60).await.is_err());
    }

    #[tokio::test]
    async fn fetch_fails_on_malformed_body() {
        let app = Router::new().route("/signals", get(|| async { "not json" }));
        let base = serve(app).await;

        let client = HttpSignalClient::new(&base).unwrap();
        let pair = Pair::new(Coin::new("ETH"), Coin::new("USD"));
        assert!(client.fetch(&pair, 15).await.is_err());
    }
}
