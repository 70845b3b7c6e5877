//! Transaction builder: the pure core of the per-account pipeline.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{Account, AlgorithmSignal, TradeType, TransactionInfo};
use crate::error::{Result, TransactorError};

/// Fixed scaling applied to the signalled amount.
const AMOUNT_MULTIPLIER: Decimal = dec!(10);

/// What one account iteration produced.
///
/// A `no_action` signal skips the account rather than building a zero-effect
/// transaction; the skip is an outcome, not an error, so runs can count it
/// separately from failures.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Built(TransactionInfo),
    NoActionSkip,
}

/// Combine an account, the algorithm directory, and the current signal map
/// into a transaction instruction.
pub fn build_transaction(
    account: &Account,
    directory: &HashMap<Uuid, String>,
    signals: &HashMap<String, AlgorithmSignal>,
) -> Result<BuildOutcome> {
    let algorithm_name = directory
        .get(&account.algorithm)
        .ok_or(TransactorError::AlgorithmNotFound(account.algorithm))?;

    let signal = signals
        .get(algorithm_name)
        .ok_or_else(|| TransactorError::SignalNotFound(algorithm_name.clone()))?;

    if signal.signal == TradeType::NoAction {
        return Ok(BuildOutcome::NoActionSkip);
    }

    Ok(BuildOutcome::Built(TransactionInfo {
        amount: signal.amount * AMOUNT_MULTIPLIER,
        action: signal.signal,
        pair: account.pair.clone(),
        provider: Some(account.provider.clone()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coin, Pair};

    fn account(algorithm: Uuid) -> Account {
        Account {
            id: Uuid::new_v4(),
            algorithm,
            encrypted_private_key: "k1:s1".into(),
            pair: Pair::new(Coin::new("BTC"), Coin::new("USD")),
            provider: "kraken".into(),
            interval: 60,
        }
    }

    fn signal(name: &str, amount: Decimal, action: TradeType) -> AlgorithmSignal {
        AlgorithmSignal {
            algorithm: name.to_string(),
            amount,
            signal: action,
        }
    }

    #[test]
    fn builds_a_scaled_transaction() {
        let algorithm = Uuid::new_v4();
        let directory = HashMap::from([(algorithm, "macd_cross".to_string())]);
        let signals = HashMap::from([(
            "macd_cross".to_string(),
            signal("macd_cross", dec!(15), TradeType::Buy),
        )]);

        let outcome = build_transaction(&account(algorithm), &directory, &signals).unwrap();
        let BuildOutcome::Built(info) = outcome else {
            panic!("expected a built transaction");
        };

        assert_eq!(info.amount, dec!(150));
        assert_eq!(info.action, TradeType::Buy);
        assert_eq!(info.pair.to_string(), "BTC-USD");
        assert_eq!(info.provider.as_deref(), Some("kraken"));
    }

    #[test]
    fn unknown_algorithm_id_is_a_resolution_error() {
        let directory = HashMap::from([(Uuid::new_v4(), "macd_cross".to_string())]);
        let signals = HashMap::new();

        let err = build_transaction(&account(Uuid::new_v4()), &directory, &signals)
            .expect_err("unmapped algorithm id must fail");
        assert!(matches!(err, TransactorError::AlgorithmNotFound(_)));
    }

    #[test]
    fn missing_signal_is_a_resolution_error() {
        let algorithm = Uuid::new_v4();
        let directory = HashMap::from([(algorithm, "macd_cross".to_string())]);
        let signals = HashMap::from([(
            "rsi_dip".to_string(),
            signal("rsi_dip", dec!(1), TradeType::Sell),
        )]);

        let err = build_transaction(&account(algorithm), &directory, &signals)
            .expect_err("absent signal must fail");
        assert!(matches!(err, TransactorError::SignalNotFound(name) if name == "macd_cross"));
    }

    #[test]
    fn no_action_skips_instead_of_building() {
        let algorithm = Uuid::new_v4();
        let directory = HashMap::from([(algorithm, "macd_cross".to_string())]);
        let signals = HashMap::from([(
            "macd_cross".to_string(),
            signal("macd_cross", dec!(15), TradeType::NoAction),
        )]);

        let outcome = build_transaction(&account(algorithm), &directory, &signals).unwrap();
        assert_eq!(outcome, BuildOutcome::NoActionSkip);
    }
}
