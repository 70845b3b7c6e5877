//! Exchange provider abstraction.
//!
//! Each variant owns its credential validation, verification capability, and
//! swap execution; the registry is the only place a provider name string is
//! interpreted.

pub mod coinbase;
pub mod kraken;
pub mod void;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::{Account, Pair, TransactionInfo, TransactionResult};
use crate::error::{Result, TransactorError};

pub use coinbase::CoinbaseProvider;
pub use kraken::KrakenProvider;
pub use void::VoidProvider;

/// The set of exchange backends the registry can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Void,
    Coinbase,
    Kraken,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Coinbase => "coinbase",
            Self::Kraken => "kraken",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "void" => Ok(Self::Void),
            "coinbase" => Ok(Self::Coinbase),
            "kraken" => Ok(Self::Kraken),
            _ => Err("invalid provider; expected void|coinbase|kraken"),
        }
    }
}

pub fn parse_provider_kind(raw: &str) -> Result<ProviderKind> {
    ProviderKind::from_str(raw).map_err(|_| TransactorError::UnknownProvider(raw.to_string()))
}

/// Key/secret pair parsed from the account's opaque credential string.
///
/// The wire format at the provider boundary is `"<key>:<secret>"`; anything
/// other than exactly two colon-separated fields fails closed.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
}

impl ApiCredentials {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(secret), None) => Ok(Self {
                key: key.to_string(),
                secret: secret.to_string(),
            }),
            _ => Err(TransactorError::Credential(
                "expected exactly two colon-separated fields (<key>:<secret>)".to_string(),
            )),
        }
    }
}

/// Verification payload, tagged per provider.
///
/// Each provider accepts only its own variant; handing a provider any other
/// kind is a VerificationError. This replaces ad hoc downcasting with a
/// checked capability contract.
#[derive(Debug, Clone)]
pub enum VerifyPayload {
    Void,
    Coinbase { passphrase: Option<String> },
    Kraken { min_balance: Option<Decimal> },
}

impl VerifyPayload {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Void => ProviderKind::Void,
            Self::Coinbase { .. } => ProviderKind::Coinbase,
            Self::Kraken { .. } => ProviderKind::Kraken,
        }
    }
}

pub(crate) fn wrong_payload(expected: ProviderKind, got: &VerifyPayload) -> TransactorError {
    TransactorError::Verification(format!(
        "expected {} verification payload, got {}",
        expected,
        got.kind()
    ))
}

/// An exchange integration capable of verifying credentials and executing
/// swaps.
#[async_trait]
pub trait TradeProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Provider-specific capability check with the tagged payload contract.
    async fn verify(&self, payload: VerifyPayload) -> Result<()>;

    /// Whether this provider can trade the pair.
    async fn pair_supported(&self, pair: &Pair) -> Result<bool>;

    /// Execute (or simulate) the trade.
    async fn swap(
        &self,
        account: &Account,
        transaction: &TransactionInfo,
    ) -> Result<TransactionResult>;
}

/// Construct a provider from its name and the account's credential string.
///
/// The credential format is validated uniformly before any variant-specific
/// work, so a malformed string fails closed regardless of backend.
pub fn build_provider(kind: ProviderKind, credential: &str) -> Result<Arc<dyn TradeProvider>> {
    let credentials = ApiCredentials::parse(credential)?;

    match kind {
        ProviderKind::Void => Ok(Arc::new(VoidProvider::new())),
        ProviderKind::Coinbase => Ok(Arc::new(CoinbaseProvider::new(credentials))),
        ProviderKind::Kraken => Ok(Arc::new(KrakenProvider::new(credentials)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_exactly_two_fields() {
        let creds = ApiCredentials::parse("k1:s1").expect("two fields should parse");
        assert_eq!(creds.key, "k1");
        assert_eq!(creds.secret, "s1");

        assert!(matches!(
            ApiCredentials::parse("k1"),
            Err(TransactorError::Credential(_))
        ));
        assert!(matches!(
            ApiCredentials::parse("k1:s1:extra"),
            Err(TransactorError::Credential(_))
        ));
    }

    #[test]
    fn provider_kind_parses_known_names_only() {
        assert_eq!(parse_provider_kind("void").unwrap(), ProviderKind::Void);
        assert_eq!(parse_provider_kind("Coinbase").unwrap(), ProviderKind::Coinbase);
        assert_eq!(parse_provider_kind("kraken").unwrap(), ProviderKind::Kraken);
        assert!(matches!(
            parse_provider_kind("binance"),
            Err(TransactorError::UnknownProvider(_))
        ));
    }

    #[test]
    fn registry_builds_each_variant() {
        for (name, kind) in [
            ("void", ProviderKind::Void),
            ("coinbase", ProviderKind::Coinbase),
            ("kraken", ProviderKind::Kraken),
        ] {
            let provider = build_provider(parse_provider_kind(name).unwrap(), "k1:s1")
                .expect("well-formed credential should construct");
            assert_eq!(provider.kind(), kind);
        }
    }

    #[test]
    fn registry_fails_closed_on_malformed_credential() {
        for kind in [ProviderKind::Void, ProviderKind::Coinbase, ProviderKind::Kraken] {
            assert!(matches!(
                build_provider(kind, "k1"),
                Err(TransactorError::Credential(_))
            ));
        }
    }
}
