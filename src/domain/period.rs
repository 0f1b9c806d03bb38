//! Distribution period: the half-open accounting interval `[start, end)`.

use super::Uint;
use serde::Serialize;

/// Accounting interval over which time-weighting is computed.
///
/// Invariant: `start <= end`. A degenerate period (`start == end`) is valid
/// and yields zero weight for every trove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionPeriod {
    pub start: Uint,
    pub end: Uint,
}

impl DistributionPeriod {
    /// Build a period, clamping `start` to `end` to preserve the ordering
    /// invariant.
    pub fn new(start: Uint, end: Uint) -> Self {
        let start = start.min(end.clone());
        DistributionPeriod { start, end }
    }

    /// Length of the period in seconds. Saturates to zero if the ordering
    /// invariant was bypassed by literal construction.
    pub fn duration(&self) -> Uint {
        self.end.saturating_sub(&self.start)
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}
