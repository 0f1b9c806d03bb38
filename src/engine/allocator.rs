//! Pro-rata reward allocation.
//!
//! Each trove's weight is `TWA * active_time`; rewards are split by weight
//! share with independent floor division. Up to `trove_count - 1` base units
//! stay unallocated as rounding remainder; the remainder is not swept.

use crate::domain::{TroveDistribution, TroveTwa, Uint};

/// Allocate `total_reward` across the given TWA results.
///
/// Zero total weight (every trove has zero TWA or zero active time) yields a
/// zero allocation for every trove; there is no division-by-zero path.
pub fn allocate(twa_results: &[TroveTwa], total_reward: &Uint) -> Vec<TroveDistribution> {
    let weights: Vec<Uint> = twa_results
        .iter()
        .map(|twa| twa.time_weighted_average.clone() * twa.active_time.clone())
        .collect();
    let total_weight: Uint = weights.iter().cloned().sum();

    twa_results
        .iter()
        .zip(weights)
        .map(|(twa, weight)| {
            let reward_amount = if total_weight.is_zero() {
                Uint::zero()
            } else {
                total_reward.clone() * weight.clone() / total_weight.clone()
            };

            TroveDistribution {
                trove_id: twa.trove_id.clone(),
                borrower: twa.borrower.clone(),
                collateral_id: twa.collateral_id.clone(),
                time_weighted_average: twa.time_weighted_average.clone(),
                active_time: twa.active_time.clone(),
                weight,
                reward_amount,
            }
        })
        .collect()
}

/// Sum of allocated amounts; never exceeds the total passed to [`allocate`].
pub fn total_allocated(distributions: &[TroveDistribution]) -> Uint {
    distributions
        .iter()
        .map(|d| d.reward_amount.clone())
        .sum()
}
