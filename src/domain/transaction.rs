use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Pair, TradeType};

/// An algorithm's current recommendation for one pair/interval, as returned
/// by the signal service. Consumed read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmSignal {
    pub algorithm: String,
    // The service emits plain JSON numbers.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub signal: TradeType,
}

/// A transaction instruction built for one account iteration.
///
/// Serializes into the router wire format (`{Amount, Action, Pair,
/// Provider}`); constructed transiently and never persisted by this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionInfo {
    // The router expects `Amount` as a JSON number, not a decimal string.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub action: TradeType,
    pub pair: Pair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Opaque receipt returned by a provider swap (or synthesized by a
/// dispatcher ack). Logged only; not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    pub id: String,
    pub time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coin;
    use rust_decimal_macros::dec;

    #[test]
    fn transaction_info_uses_router_wire_casing() {
        let info = TransactionInfo {
            amount: dec!(150),
            action: TradeType::Buy,
            pair: Pair::new(Coin::new("BTC"), Coin::new("USD")),
            provider: Some("kraken".into()),
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["Amount"].as_f64(), Some(150.0));
        assert_eq!(value["Action"], "buy");
        assert_eq!(value["Pair"], "BTC-USD");
        assert_eq!(value["Provider"], "kraken");
    }

    #[test]
    fn provider_field_is_omitted_when_absent() {
        let info = TransactionInfo {
            amount: dec!(10),
            action: TradeType::Sell,
            pair: Pair::new(Coin::new("ETH"), Coin::new("USD")),
            provider: None,
        };

        let value = serde_json::to_value(&info).unwrap();
        assert!(value.get("Provider").is_none());
    }

    #[test]
    fn algorithm_signal_decodes_service_body() {
        let body = r#"{"algorithm":"macd_cross","amount":12.5,"signal":"sell"}"#;
        let signal: AlgorithmSignal = serde_json::from_str(body).unwrap();
        assert_eq!(signal.algorithm, "macd_cross");
        assert_eq!(signal.amount, dec!(12.5));
        assert_eq!(signal.signal, TradeType::Sell);
    }
}
