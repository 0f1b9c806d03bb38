//! Derived distribution records: per-trove TWA results, per-gauge allocation
//! output, and the aggregate run report. All of these are ephemeral; nothing
//! here is persisted by this crate.

use super::{Address, CollateralId, DistributionPeriod, TroveId, Uint};
use serde::Serialize;

/// Time-weighted average collateral size for one trove over its active
/// sub-window of the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TroveTwa {
    pub trove_id: TroveId,
    pub borrower: Address,
    pub collateral_id: CollateralId,
    pub time_weighted_average: Uint,
    /// Seconds the trove existed inside the period.
    pub active_time: Uint,
}

/// A trove's share of a gauge/epoch reward pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TroveDistribution {
    pub trove_id: TroveId,
    pub borrower: Address,
    pub collateral_id: CollateralId,
    pub time_weighted_average: Uint,
    pub active_time: Uint,
    /// Allocation weight: `time_weighted_average * active_time`.
    pub weight: Uint,
    pub reward_amount: Uint,
}

/// Resolved accounting context for one gauge: which epoch to allocate, over
/// which period, and how much is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GaugeDistributionInfo {
    pub gauge: Address,
    pub token: Address,
    pub period: DistributionPeriod,
    pub latest_distributed_epoch: Uint,
    pub claim_epoch: Uint,
    /// Sum of fee-excluded claim amounts at (gauge, claim_epoch).
    pub total_rewards: Uint,
}

/// Completed per-gauge result: the resolved context plus the ordered list of
/// per-trove allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GaugeDistribution {
    pub gauge: Address,
    pub token: Address,
    pub period: DistributionPeriod,
    pub latest_distributed_epoch: Uint,
    pub claim_epoch: Uint,
    pub total_rewards: Uint,
    /// Sum of allocated amounts. At most `total_rewards`; the shortfall is
    /// the floor-division rounding remainder, bounded by the trove count.
    pub total_allocated: Uint,
    pub distributions: Vec<TroveDistribution>,
}

/// Why a gauge produced no distribution this run. These are valid terminal
/// states, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No un-distributed claims at the gauge's claim epoch.
    NoRewards,
    /// The gauge's token maps to no known collateral branch.
    NoCollateral,
    /// No trove was active at any point inside the period.
    NoActiveTroves,
}

/// Terminal state of one gauge's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GaugeStatus {
    Completed(GaugeDistribution),
    Skipped { reason: SkipReason },
    Failed { error: String },
}

/// One gauge's outcome within a run. Failed gauges are reported here rather
/// than aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GaugeOutcome {
    pub gauge: Address,
    #[serde(flatten)]
    pub status: GaugeStatus,
}

/// Aggregate counters across all gauges in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub gauges_discovered: usize,
    pub gauges_completed: usize,
    pub gauges_skipped: usize,
    pub gauges_failed: usize,
    pub troves_processed: usize,
    /// Stake events observed this run. Diagnostic only; stakes carry no
    /// allocation weight.
    pub stake_events_seen: usize,
    pub total_allocated: Uint,
}

/// Full output of one distribution run: every discovered gauge appears in
/// `outcomes` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionRun {
    pub outcomes: Vec<GaugeOutcome>,
    pub summary: RunSummary,
}

impl DistributionRun {
    /// Build the run report from per-gauge outcomes, tallying the summary.
    pub fn from_outcomes(outcomes: Vec<GaugeOutcome>) -> Self {
        let mut summary = RunSummary {
            gauges_discovered: outcomes.len(),
            gauges_completed: 0,
            gauges_skipped: 0,
            gauges_failed: 0,
            troves_processed: 0,
            stake_events_seen: 0,
            total_allocated: Uint::zero(),
        };

        for outcome in &outcomes {
            match &outcome.status {
                GaugeStatus::Completed(distribution) => {
                    summary.gauges_completed += 1;
                    summary.troves_processed += distribution.distributions.len();
                    summary.total_allocated += distribution.total_allocated.clone();
                }
                GaugeStatus::Skipped { .. } => summary.gauges_skipped += 1,
                GaugeStatus::Failed { .. } => summary.gauges_failed += 1,
            }
        }

        DistributionRun { outcomes, summary }
    }
}
