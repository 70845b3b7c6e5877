//! Dispatch strategies.
//!
//! The same contract — hand a built transaction to something that executes
//! it — has two valid designs: forward it to the external router service, or
//! call the exchange provider directly. The strategy is picked once at
//! configuration time; the orchestrator only sees the trait.

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::RouterClient;
use crate::domain::{Account, TransactionInfo, TransactionResult};
use crate::error::{Result, TransactorError};
use crate::provider::{build_provider, parse_provider_kind};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Execute one built transaction. At most one attempt per account per
    /// run; failures are logged by the caller, never retried.
    async fn dispatch(
        &self,
        account: &Account,
        transaction: &TransactionInfo,
    ) -> Result<TransactionResult>;
}

/// Forward the transaction to `POST {router}/route` (the default strategy).
pub struct RouterDispatcher {
    router: RouterClient,
}

impl RouterDispatcher {
    pub fn new(router: RouterClient) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Dispatch for RouterDispatcher {
    async fn dispatch(
        &self,
        account: &Account,
        transaction: &TransactionInfo,
    ) -> Result<TransactionResult> {
        debug!(account = %account.id, "Forwarding transaction to router");
        self.router.route(transaction).await
    }
}

/// Resolve the account's provider and call `swap` on it directly.
///
/// A fresh provider is constructed per account per run; credentials repeat
/// rarely enough that instance caching is an optimization, not a
/// correctness requirement.
pub struct DirectDispatcher;

impl DirectDispatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatch for DirectDispatcher {
    async fn dispatch(
        &self,
        account: &Account,
        transaction: &TransactionInfo,
    ) -> Result<TransactionResult> {
        let kind = parse_provider_kind(&account.provider)?;
        let provider = build_provider(kind, &account.encrypted_private_key)?;

        if !provider.pair_supported(&account.pair).await? {
            return Err(TransactorError::Dispatch(format!(
                "provider '{}' does not support pair {}",
                kind, account.pair
            )));
        }

        provider.swap(account, transaction).await
    }
}
