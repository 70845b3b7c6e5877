//! Void provider: a deterministic sink that accepts every swap.
//!
//! Useful for wiring tests and dry-run fleets; the synthetic result id is
//! the hex-encoded unix timestamp at execution time.

use async_trait::async_trait;
use chrono::Utc;

use super::{wrong_payload, ProviderKind, TradeProvider, VerifyPayload};
use crate::domain::{Account, Pair, TransactionInfo, TransactionResult};
use crate::error::Result;

pub struct VoidProvider;

impl VoidProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VoidProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeProvider for VoidProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Void
    }

    async fn verify(&self, payload: VerifyPayload) -> Result<()> {
        match payload {
            VerifyPayload::Void => Ok(()),
            other => Err(wrong_payload(ProviderKind::Void, &other)),
        }
    }

    async fn pair_supported(&self, _pair: &Pair) -> Result<bool> {
        // A sink trades anything.
        Ok(true)
    }

    async fn swap(
        &self,
        _account: &Account,
        _transaction: &TransactionInfo,
    ) -> Result<TransactionResult> {
        let now = Utc::now();

        Ok(TransactionResult {
            id: hex::encode(now.timestamp().to_string()),
            time: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coin, TradeType};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn account() -> Account {
        Account {
            id: Uuid::new_v4(),
            algorithm: Uuid::new_v4(),
            encrypted_private_key: "k1:s1".into(),
            pair: Pair::new(Coin::new("BTC"), Coin::new("USD")),
            provider: "void".into(),
            interval: 60,
        }
    }

    fn transaction() -> TransactionInfo {
        TransactionInfo {
            amount: dec!(100),
            action: TradeType::Buy,
            pair: Pair::new(Coin::new("BTC"), Coin::new("USD")),
            provider: Some("void".into()),
        }
    }

    #[tokio::test]
    async fn swap_always_succeeds_with_synthetic_result() {
        let provider = VoidProvider::new();
        let result = provider.swap(&account(), &transaction()).await.unwrap();

        assert!(!result.id.is_empty());
        assert!(result.time <= Utc::now());
    }

    #[tokio::test]
    async fn verify_accepts_only_its_own_payload_kind() {
        let provider = VoidProvider::new();

        assert!(provider.verify(VerifyPayload::Void).await.is_ok());
        assert!(provider
            .verify(VerifyPayload::Coinbase { passphrase: None })
            .await
            .is_err());
        assert!(provider
            .verify(VerifyPayload::Kraken { min_balance: None })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn every_pair_is_supported() {
        let provider = VoidProvider::new();
        let pair = Pair::new(Coin::new("DOGE"), Coin::new("XMR"));
        assert!(provider.pair_supported(&pair).await.unwrap());
    }
}
