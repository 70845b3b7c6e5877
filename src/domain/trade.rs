use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A symbolic asset identifier (e.g. "BTC")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coin(String);

impl Coin {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two-asset market an account trades. Always exactly two coins;
/// rendered as `"A-B"` on every wire surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub a: Coin,
    pub b: Coin,
}

impl Pair {
    pub fn new(a: Coin, b: Coin) -> Self {
        Self { a, b }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

impl FromStr for Pair {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.split_once('-') {
            Some((a, b)) if !a.is_empty() && !b.is_empty() && !b.contains('-') => {
                Ok(Self::new(Coin::new(a), Coin::new(b)))
            }
            _ => Err(format!("invalid pair '{raw}'; expected '<A>-<B>'")),
        }
    }
}

impl Serialize for Pair {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Recommended action attached to a signal.
///
/// The string table is exhaustive and bidirectional; an unrecognized token is
/// a deserialization error rather than a silent fallback to a default member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    Buy,
    Sell,
    NoAction,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::NoAction => "no_action",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "no_action" => Ok(Self::NoAction),
            _ => Err("invalid trade type; expected buy|sell|no_action"),
        }
    }
}
