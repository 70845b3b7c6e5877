pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod provider;
pub mod services;

pub use adapters::{AccountFeed, HttpSignalClient, PostgresStore, RouterClient, SignalSource};
pub use config::{AppConfig, DispatchMode};
pub use domain::{
    Account, AccountStatus, AlgorithmSignal, Coin, Pair, TradeType, TransactionInfo,
    TransactionResult,
};
pub use error::{Result, TransactorError};
pub use provider::{build_provider, ApiCredentials, ProviderKind, TradeProvider, VerifyPayload};
pub use services::{
    build_transaction, BuildOutcome, DirectDispatcher, Dispatch, Orchestrator, ReadinessGate,
    RouterDispatcher, RunSummary,
};
