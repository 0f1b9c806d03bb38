//! Domain primitives: Address, TroveId, CollateralId, TroveStatus.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// On-chain address (lowercase hex string). Used for borrowers, gauges, and
/// collateral tokens alike.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Create an Address, normalizing to lowercase so subgraph and RPC
    /// spellings compare equal.
    pub fn new(addr: impl Into<String>) -> Self {
        Address(addr.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite trove identifier as assigned by the indexer:
/// `"<collateralId>:<troveId>"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TroveId(pub String);

impl TroveId {
    pub fn new(id: impl Into<String>) -> Self {
        TroveId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TroveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collateral branch index, stringly-keyed by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollateralId(pub String);

impl CollateralId {
    pub fn new(id: impl Into<String>) -> Self {
        CollateralId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollateralId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trove lifecycle status. The subgraph spells the open state `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TroveStatus {
    #[serde(rename = "active")]
    Open,
    Closed,
    Liquidated,
    Redeemed,
}

impl TroveStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, TroveStatus::Open)
    }
}

/// Error returned when a status string from the indexer is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TroveStatusParseError(pub String);

impl std::fmt::Display for TroveStatusParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown trove status: {}", self.0)
    }
}

impl std::error::Error for TroveStatusParseError {}

impl FromStr for TroveStatus {
    type Err = TroveStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TroveStatus::Open),
            "closed" => Ok(TroveStatus::Closed),
            "liquidated" => Ok(TroveStatus::Liquidated),
            "redeemed" => Ok(TroveStatus::Redeemed),
            other => Err(TroveStatusParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalizes_case() {
        let a = Address::new("0xABCdef");
        let b = Address::new("0xabcdef");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xabcdef");
    }

    #[test]
    fn test_trove_status_parse() {
        assert_eq!("active".parse::<TroveStatus>().unwrap(), TroveStatus::Open);
        assert_eq!("closed".parse::<TroveStatus>().unwrap(), TroveStatus::Closed);
        assert_eq!(
            "liquidated".parse::<TroveStatus>().unwrap(),
            TroveStatus::Liquidated
        );
        assert_eq!(
            "redeemed".parse::<TroveStatus>().unwrap(),
            TroveStatus::Redeemed
        );
        assert!("zombie".parse::<TroveStatus>().is_err());
    }

    #[test]
    fn test_trove_status_is_open() {
        assert!(TroveStatus::Open.is_open());
        assert!(!TroveStatus::Liquidated.is_open());
    }

    #[test]
    fn test_trove_status_serde_spelling() {
        let json = serde_json::to_string(&TroveStatus::Open).unwrap();
        assert_eq!(json, "\"active\"");
    }
}
