use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Pair;

/// Lifecycle status of an account ("bot") in the store.
///
/// Only `Running` accounts are picked up by a transaction run; a status
/// change takes effect on the next run since accounts are loaded fresh
/// every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Running,
    Stopped,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            _ => Err("invalid account status; expected running|stopped"),
        }
    }
}

/// A configured trading identity, read-only from this core's perspective.
///
/// `encrypted_private_key` is the opaque `"<key>:<secret>"` credential string
/// handed to the provider boundary; this core never interprets it beyond the
/// two-field split at provider construction.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub algorithm: Uuid,
    pub encrypted_private_key: String,
    pub pair: Pair,
    pub provider: String,
    pub interval: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_tokens_only() {
        assert_eq!("running".parse::<AccountStatus>(), Ok(AccountStatus::Running));
        assert_eq!("stopped".parse::<AccountStatus>(), Ok(AccountStatus::Stopped));
        assert!("paused".parse::<AccountStatus>().is_err());
    }
}
