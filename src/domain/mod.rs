pub mod account;
pub mod trade;
pub mod transaction;

pub use account::{Account, AccountStatus};
pub use trade::{Coin, Pair, TradeType};
pub use transaction::{AlgorithmSignal, TransactionInfo, TransactionResult};
