//! Kraken provider: a real exchange REST binding.
//!
//! Private calls carry the standard Kraken `API-Sign`:
//! base64(HMAC-SHA512(decoded secret, path || SHA256(nonce || postdata))).
//! `verify` proves the credentials can fetch the account balance; `swap`
//! places a limit order sized at one unit with the transaction amount as the
//! price, mirroring the routed order shape.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256, Sha512};
use std::collections::HashMap;
use std::time::Duration;

use super::{wrong_payload, ApiCredentials, ProviderKind, TradeProvider, VerifyPayload};
use crate::domain::{Account, Pair, TradeType, TransactionInfo, TransactionResult};
use crate::error::{Result, TransactorError};

type HmacSha512 = Hmac<Sha512>;

const API_BASE: &str = "https://api.kraken.com";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Kraken wraps every response in `{error: [...], result: {...}}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: Vec<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct AddOrderResult {
    #[serde(default)]
    txid: Vec<String>,
}

pub struct KrakenProvider {
    base_url: String,
    credentials: ApiCredentials,
    http: Client,
}

impl KrakenProvider {
    pub fn new(credentials: ApiCredentials) -> Result<Self> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            base_url: API_BASE.to_string(),
            credentials,
            http,
        })
    }

    /// Kraken pair notation is the two assets concatenated (`BTCUSD`).
    fn kraken_pair(pair: &Pair) -> String {
        format!("{}{}", pair.a, pair.b)
    }

    fn sign(&self, path: &str, nonce: &str, postdata: &str) -> Result<String> {
        let secret = BASE64.decode(&self.credentials.secret).map_err(|e| {
            TransactorError::Credential(format!("secret is not valid base64: {e}"))
        })?;

        let digest = Sha256::digest(format!("{nonce}{postdata}").as_bytes());

        let mut mac = HmacSha512::new_from_slice(&secret)
            .map_err(|e| TransactorError::Verification(format!("HMAC init failed: {e}")))?;
        mac.update(path.as_bytes());
        mac.update(&digest);

        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    async fn private_post<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, String)],
    ) -> Result<T> {
        let nonce = Utc::now().timestamp_millis().to_string();

        let postdata = {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            serializer.append_pair("nonce", &nonce);
            for (name, value) in fields {
                serializer.append_pair(name, value);
            }
            serializer.finish()
        };

        let signature = self.sign(path, &nonce, &postdata)?;

        let envelope: Envelope<T> = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("API-Key", &self.credentials.key)
            .header("API-Sign", signature)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(postdata)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !envelope.error.is_empty() {
            return Err(TransactorError::Swap(envelope.error.join("; ")));
        }

        envelope
            .result
            .ok_or_else(|| TransactorError::Swap("kraken response missing result".to_string()))
    }

    fn order_fields(transaction: &TransactionInfo) -> Result<Vec<(&'static str, String)>> {
        let side = match transaction.action {
            TradeType::Buy => "buy",
            TradeType::Sell => "sell",
            TradeType::NoAction => {
                return Err(TransactorError::Swap(
                    "refusing to place a no_action order".to_string(),
                ))
            }
        };

        Ok(vec![
            ("ordertype", "limit".to_string()),
            ("type", side.to_string()),
            ("volume", "1".to_string()),
            ("pair", Self::kraken_pair(&transaction.pair)),
            ("price", transaction.amount.to_string()),
        ])
    }
}

#[async_trait]
impl TradeProvider for KrakenProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Kraken
    }

    async fn verify(&self, payload: VerifyPayload) -> Result<()> {
        let VerifyPayload::Kraken { min_balance } = payload else {
            return Err(wrong_payload(ProviderKind::Kraken, &payload));
        };

        let balances: HashMap<String, String> =
            self.private_post("/0/private/Balance", &[]).await?;

        if let Some(min) = min_balance {
            let total: Decimal = balances
                .values()
                .filter_map(|raw| raw.parse::<Decimal>().ok())
                .sum();
            if total < min {
                return Err(TransactorError::Verification(format!(
                    "balance {total} below required minimum {min}"
                )));
            }
        }

        Ok(())
    }

    async fn pair_supported(&self, pair: &Pair) -> Result<bool> {
        let envelope: Envelope<HashMap<String, serde_json::Value>> = self
            .http
            .get(format!("{}/0/public/AssetPairs", self.base_url))
            .query(&[("pair", Self::kraken_pair(pair))])
            .send()
            .await?
            .json()
            .await?;

        // Kraken reports an unknown pair as an error entry, not a 4xx.
        Ok(envelope.error.is_empty() && envelope.result.map_or(false, |r| !r.is_empty()))
    }

    async fn swap(
        &self,
        _account: &Account,
        transaction: &TransactionInfo,
    ) -> Result<TransactionResult> {
        let fields = Self::order_fields(transaction)?;
        let result: AddOrderResult = self.private_post("/0/private/AddOrder", &fields).await?;

        if result.txid.is_empty() {
            return Err(TransactorError::Swap(
                "kraken accepted the order but returned no txid".to_string(),
            ));
        }

        Ok(TransactionResult {
            id: result.txid.join(","),
            time: Utc::now(),
        })
    }
}
