use thiserror::Error;
use uuid::Uuid;

/// Main error type for the transactor
#[derive(Error, Debug)]
pub enum TransactorError {
    // Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Account/algorithm store errors (fatal to the run)
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // One malformed record; skipped, never fatal
    #[error("Record decode error: {0}")]
    Decode(String),

    // Remote collaborator errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Readiness gating (fatal to the run)
    #[error("Transaction router at {url} did not become ready within {waited_ms}ms")]
    RouterUnavailable { url: String, waited_ms: u128 },

    // Resolution errors (per-account)
    #[error("Algorithm {0} not found in the algorithm directory")]
    AlgorithmNotFound(Uuid),

    #[error("No signal for algorithm '{0}' in the signal service response")]
    SignalNotFound(String),

    // Provider construction / capability errors (per-account)
    #[error("Credential format error: {0}")]
    Credential(String),

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Unknown provider: '{0}'")]
    UnknownProvider(String),

    // Dispatch errors (per-account, at-most-once best effort)
    #[error("Swap failed: {0}")]
    Swap(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    // Run discipline
    #[error("A transaction run is already in progress")]
    RunInProgress,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl TransactorError {
    /// Whether this error is contained to a single account iteration.
    ///
    /// Run-level failures (config, store, readiness) abort the run; anything
    /// else is logged and the stream moves on to the next account.
    pub fn is_account_scoped(&self) -> bool {
        !matches!(
            self,
            TransactorError::Config(_)
                | TransactorError::Store(_)
                | TransactorError::Migration(_)
                | TransactorError::RouterUnavailable { .. }
                | TransactorError::RunInProgress
        )
    }
}

/// Result type alias for TransactorError
pub type Result<T> = std::result::Result<T, TransactorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors_are_account_scoped() {
        assert!(TransactorError::AlgorithmNotFound(Uuid::nil()).is_account_scoped());
        assert!(TransactorError::SignalNotFound("macd".into()).is_account_scoped());
        assert!(TransactorError::Credential("missing secret".into()).is_account_scoped());
        assert!(TransactorError::Swap("rejected".into()).is_account_scoped());
    }

    #[test]
    fn run_level_errors_are_not_account_scoped() {
        let readiness = TransactorError::RouterUnavailable {
            url: "http://localhost:6278/ping".into(),
            waited_ms: 30_000,
        };
        assert!(!readiness.is_account_scoped());
        assert!(!TransactorError::RunInProgress.is_account_scoped());
    }
}
