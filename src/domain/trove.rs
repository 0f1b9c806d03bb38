//! Trove (collateralized position) entity and its collateral-size history.

use super::{Address, CollateralId, TroveId, TroveStatus, Uint};
use serde::Serialize;

/// A borrower's collateralized debt position.
///
/// `closed_at` is set exactly once and never unset; a trove with
/// `closed_at == None` is currently open. Troves are never deleted, only
/// status-transitioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trove {
    pub id: TroveId,
    pub borrower: Address,
    pub collateral_id: CollateralId,
    /// Current collateral size. Used as the TWA fallback when no snapshots
    /// exist inside the active window.
    pub deposit: Uint,
    pub created_at: Uint,
    pub closed_at: Option<Uint>,
    pub status: TroveStatus,
}

/// Point-in-time record of a trove's collateral size. Append-only; one row
/// per collateral-changing event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollateralSnapshot {
    pub trove_id: TroveId,
    pub deposit: Uint,
    pub timestamp: Uint,
}
