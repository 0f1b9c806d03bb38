//! Domain types for the rewards distribution engine.
//!
//! This module provides:
//! - Arbitrary-precision numeric handling via the Uint wrapper
//! - Domain primitives: Address, TroveId, CollateralId, TroveStatus
//! - Indexed event entities and trove/snapshot records
//! - Derived distribution result types with JSON serialization

pub mod distribution;
pub mod events;
pub mod period;
pub mod primitives;
pub mod trove;
pub mod uint;

pub use distribution::{
    DistributionRun, GaugeDistribution, GaugeDistributionInfo, GaugeOutcome, GaugeStatus,
    RunSummary, SkipReason, TroveDistribution, TroveTwa,
};
pub use events::{ClaimEvent, DistributionEvent, GaugeRecord, StakeEvent};
pub use period::DistributionPeriod;
pub use primitives::{Address, CollateralId, TroveId, TroveStatus, TroveStatusParseError};
pub use trove::{CollateralSnapshot, Trove};
pub use uint::Uint;
