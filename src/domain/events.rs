//! Reward-manager event entities, as indexed by the subgraph.
//!
//! All three event types are append-only logs; the retrieval layer returns
//! them in cursor order. Numeric fields are converted from the indexer's
//! string encoding at the retrieval boundary.

use super::{Address, Uint};
use serde::Serialize;

/// Gauge-to-collateral-token mapping entry. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GaugeRecord {
    pub gauge: Address,
    pub token: Address,
}

/// Collateral staked into a gauge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakeEvent {
    pub gauge: Address,
    pub token: Address,
    pub amount: Uint,
    pub block_number: Uint,
    pub timestamp: Uint,
    pub transaction_hash: String,
}

/// Rewards claimed through a gauge for a given epoch. The distributable
/// amount is `total - claim_fee`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimEvent {
    pub gauge: Address,
    pub total: Uint,
    pub claim_fee: Uint,
    pub epoch: Uint,
    pub block_number: Uint,
    pub timestamp: Uint,
    pub transaction_hash: String,
}

impl ClaimEvent {
    /// Amount available for distribution once the protocol fee is withheld.
    /// Clamped at zero rather than trusting the indexer to keep
    /// `claim_fee <= total`.
    pub fn distributable(&self) -> Uint {
        self.total.saturating_sub(&self.claim_fee)
    }
}

/// Record that rewards for a gauge/epoch were already paid out. Only the
/// maximum epoch per gauge matters downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEvent {
    pub gauge: Address,
    pub epoch: Uint,
    pub recipients: Uint,
    pub total_reward_amount: Uint,
    pub timestamp: Uint,
}
