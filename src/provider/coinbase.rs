//! Coinbase Exchange provider.
//!
//! Request signing is wired end to end (HMAC-SHA256 over
//! `{timestamp}{METHOD}{path}{body}` with the base64-decoded secret), but
//! `verify` unconditionally fails: trading through Coinbase is disabled as a
//! safety stance, and `swap` verifies before it would ever place an order.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha2::Sha256;
use std::time::Duration;

use super::{wrong_payload, ApiCredentials, ProviderKind, TradeProvider, VerifyPayload};
use crate::domain::{Account, Pair, TradeType, TransactionInfo, TransactionResult};
use crate::error::{Result, TransactorError};

type HmacSha256 = Hmac<Sha256>;

const SANDBOX_API_BASE: &str = "https://api-public.sandbox.exchange.coinbase.com";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Signed request headers for the Coinbase Exchange API.
#[derive(Debug, Clone)]
pub struct CoinbaseAuth {
    pub key: String,
    pub signature: String,
    pub timestamp: i64,
    pub passphrase: Option<String>,
}

#[derive(Debug, Serialize)]
struct OrderBody {
    #[serde(rename = "type")]
    order_type: &'static str,
    side: TradeType,
    product_id: String,
    price: String,
    size: &'static str,
}

pub struct CoinbaseProvider {
    base_url: String,
    credentials: ApiCredentials,
    http: Client,
}

impl CoinbaseProvider {
    pub fn new(credentials: ApiCredentials) -> Self {
        Self {
            base_url: SANDBOX_API_BASE.to_string(),
            credentials,
            http: Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    fn build_message(timestamp: i64, method: &str, path: &str, body: &str) -> String {
        format!("{}{}{}{}", timestamp, method.to_uppercase(), path, body)
    }

    /// Create the signed auth material for one request.
    pub fn sign_request(
        &self,
        method: &str,
        path: &str,
        body: &str,
        timestamp: i64,
    ) -> Result<CoinbaseAuth> {
        let secret = BASE64.decode(&self.credentials.secret).map_err(|e| {
            TransactorError::Credential(format!("secret is not valid base64: {e}"))
        })?;

        let mut mac = HmacSha256::new_from_slice(&secret)
            .map_err(|e| TransactorError::Verification(format!("HMAC init failed: {e}")))?;
        mac.update(Self::build_message(timestamp, method, path, body).as_bytes());

        Ok(CoinbaseAuth {
            key: self.credentials.key.clone(),
            signature: BASE64.encode(mac.finalize().into_bytes()),
            timestamp,
            passphrase: None,
        })
    }
}

#[async_trait]
impl TradeProvider for CoinbaseProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Coinbase
    }

    async fn verify(&self, payload: VerifyPayload) -> Result<()> {
        let VerifyPayload::Coinbase { passphrase: _ } = payload else {
            return Err(wrong_payload(ProviderKind::Coinbase, &payload));
        };

        // Trading through Coinbase is disabled until a real capability check
        // lands; every verification fails so no order can be placed.
        Err(TransactorError::Verification(
            "coinbase trading is disabled".to_string(),
        ))
    }

    async fn pair_supported(&self, _pair: &Pair) -> Result<bool> {
        // No pair trades while the provider is disabled.
        Ok(false)
    }

    async fn swap(
        &self,
        _account: &Account,
        transaction: &TransactionInfo,
    ) -> Result<TransactionResult> {
        self.verify(VerifyPayload::Coinbase { passphrase: None })
            .await?;

        // Unreachable while verify is hard-disabled; kept wired so enabling
        // the provider is a one-line change to verify.
        let body = serde_json::to_string(&OrderBody {
            order_type: "limit",
            side: transaction.action,
            product_id: transaction.pair.to_string(),
            price: transaction.amount.to_string(),
            size: "1",
        })?;

        let path = "/orders";
        let auth = self.sign_request("POST", path, &body, chrono::Utc::now().timestamp())?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("CB-ACCESS-KEY", &auth.key)
            .header("CB-ACCESS-SIGN", &auth.signature)
            .header("CB-ACCESS-TIMESTAMP", auth.timestamp.to_string())
            .header("CB-ACCESS-PASSPHRASE", auth.passphrase.unwrap_or_default())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        let order: serde_json::Value = response.json().await?;
        let id = order
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TransactorError::Swap("order response missing id".to_string()))?
            .to_string();

        Ok(TransactionResult {
            id,
            time: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coin;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn provider() -> CoinbaseProvider {
        CoinbaseProvider::new(ApiCredentials {
            key: "test-key".into(),
            secret: BASE64.encode(b"test-secret"),
        })
    }

    #[test]
    fn message_concatenates_timestamp_method_path_body() {
        let msg = CoinbaseProvider::build_message(
            1704067200,
            "post",
            "/orders",
            r#"{"test":"data"}"#,
        );
        assert_eq!(msg, r#"1704067200POST/orders{"test":"data"}"#);
    }

    #[test]
    fn signature_is_deterministic_base64_hmac() {
        let provider = provider();
        let a = provider.sign_request("POST", "/orders", "{}", 1704067200).unwrap();
        let b = provider.sign_request("POST", "/orders", "{}", 1704067200).unwrap();
        let other = provider.sign_request("POST", "/orders", "{}", 1704067201).unwrap();

        assert_eq!(a.signature, b.signature);
        assert_ne!(a.signature, other.signature);
        // HMAC-SHA256 digests are 32 bytes
        assert_eq!(BASE64.decode(&a.signature).unwrap().len(), 32);
        assert_eq!(a.key, "test-key");
    }

    #[test]
    fn signing_rejects_non_base64_secret() {
        let provider = CoinbaseProvider::new(ApiCredentials {
            key: "k".into(),
            secret: "not base64!!".into(),
        });
        assert!(matches!(
            provider.sign_request("GET", "/accounts", "", 0),
            Err(TransactorError::Credential(_))
        ));
    }

    #[tokio::test]
    async fn verify_always_fails_while_trading_is_disabled() {
        let result = provider()
            .verify(VerifyPayload::Coinbase { passphrase: None })
            .await;
        assert!(matches!(result, Err(TransactorError::Verification(_))));
    }

    #[tokio::test]
    async fn verify_rejects_foreign_payload_kinds() {
        let result = provider().verify(VerifyPayload::Void).await;
        let err = result.expect_err("void payload must be rejected");
        assert!(err.to_string().contains("expected coinbase"));
    }

    #[tokio::test]
    async fn swap_is_blocked_by_the_disabled_verify() {
        let account = Account {
            id: Uuid::new_v4(),
            algorithm: Uuid::new_v4(),
            encrypted_private_key: "k:s".into(),
            pair: Pair::new(Coin::new("BTC"), Coin::new("USD")),
            provider: "coinbase".into(),
            interval: 60,
        };
        let transaction = TransactionInfo {
            amount: dec!(10),
            action: TradeType::Buy,
            pair: account.pair.clone(),
            provider: Some("coinbase".into()),
        };

        let result = provider().swap(&account, &transaction).await;
        assert!(matches!(result, Err(TransactorError::Verification(_))));
    }

    #[tokio::test]
    async fn no_pair_is_supported_while_disabled() {
        let pair = Pair::new(Coin::new("BTC"), Coin::new("USD"));
        assert!(!provider().pair_supported(&pair).await.unwrap());
    }
}
