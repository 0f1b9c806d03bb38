//! Time-weighted average collateral computation.
//!
//! The core algorithm: clamp a trove's lifetime to the accounting period,
//! integrate its collateral size over that window from its snapshot history,
//! and divide by the window length. All arithmetic is arbitrary-precision
//! integer; multiplication happens before division so no precision is lost
//! before the final floor.

use crate::domain::{CollateralSnapshot, DistributionPeriod, Trove, TroveTwa, Uint};
use std::collections::HashMap;

/// Compute the time-weighted average collateral size for one trove.
///
/// `snapshots` must be sorted ascending by timestamp (the retrieval layer
/// guarantees this) and may be empty. When no snapshot falls inside the
/// trove's active window, the trove's current deposit stands in for the
/// whole window: the deliberate approximation for troves whose size never
/// changed inside the period.
pub fn compute_twa(
    trove: &Trove,
    snapshots: &[CollateralSnapshot],
    period: &DistributionPeriod,
) -> TroveTwa {
    // Clamp the trove's lifetime to the period.
    let active_start = trove.created_at.clone().max(period.start.clone());
    let active_end = trove
        .closed_at
        .clone()
        .unwrap_or_else(|| period.end.clone())
        .min(period.end.clone());

    // Not active inside the period at all.
    if active_start >= active_end {
        return TroveTwa {
            trove_id: trove.id.clone(),
            borrower: trove.borrower.clone(),
            collateral_id: trove.collateral_id.clone(),
            time_weighted_average: Uint::zero(),
            active_time: Uint::zero(),
        };
    }

    let active_time = active_end.clone() - active_start.clone();

    // Snapshots inside the active window, bounds inclusive.
    let relevant: Vec<&CollateralSnapshot> = snapshots
        .iter()
        .filter(|s| s.timestamp >= active_start && s.timestamp <= active_end)
        .collect();

    if relevant.is_empty() {
        return TroveTwa {
            trove_id: trove.id.clone(),
            borrower: trove.borrower.clone(),
            collateral_id: trove.collateral_id.clone(),
            time_weighted_average: trove.deposit.clone(),
            active_time,
        };
    }

    // Left-step integral. The value at window entry is assumed equal to the
    // first relevant snapshot's value; no earlier snapshot is consulted.
    let mut weighted_sum = Uint::zero();
    let mut last_timestamp = active_start;
    let mut last_value = relevant[0].deposit.clone();

    for snapshot in &relevant {
        if snapshot.timestamp <= last_timestamp {
            // Clock-tied snapshots collapse, last write wins.
            last_value = snapshot.deposit.clone();
            continue;
        }
        let duration = snapshot.timestamp.clone() - last_timestamp.clone();
        weighted_sum += last_value.clone() * duration;
        last_timestamp = snapshot.timestamp.clone();
        last_value = snapshot.deposit.clone();
    }

    // Tail segment up to the window end.
    if last_timestamp < active_end {
        weighted_sum += last_value * (active_end - last_timestamp);
    }

    let time_weighted_average = weighted_sum / active_time.clone();

    TroveTwa {
        trove_id: trove.id.clone(),
        borrower: trove.borrower.clone(),
        collateral_id: trove.collateral_id.clone(),
        time_weighted_average,
        active_time,
    }
}

/// Compute TWA results for a set of troves from a pre-fetched snapshot map.
/// Troves absent from the map fall back to the no-snapshot path.
pub fn compute_twa_for_troves(
    troves: &[Trove],
    snapshots_by_trove: &HashMap<crate::domain::TroveId, Vec<CollateralSnapshot>>,
    period: &DistributionPeriod,
) -> Vec<TroveTwa> {
    troves
        .iter()
        .map(|trove| {
            let snapshots = snapshots_by_trove
                .get(&trove.id)
                .map(|v| v.as_slice())
                .unwrap_or(&[]);
            compute_twa(trove, snapshots, period)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, CollateralId, TroveId, TroveStatus};

    fn trove(created_at: u64, closed_at: Option<u64>, deposit: u64) -> Trove {
        Trove {
            id: TroveId::new("0:1"),
            borrower: Address::new("0xb"),
            collateral_id: CollateralId::new("0"),
            deposit: Uint::from(deposit),
            created_at: Uint::from(created_at),
            closed_at: closed_at.map(Uint::from),
            status: if closed_at.is_some() {
                TroveStatus::Closed
            } else {
                TroveStatus::Open
            },
        }
    }

    fn snapshot(deposit: u64, timestamp: u64) -> CollateralSnapshot {
        CollateralSnapshot {
            trove_id: TroveId::new("0:1"),
            deposit: Uint::from(deposit),
            timestamp: Uint::from(timestamp),
        }
    }

    fn period(start: u64, end: u64) -> DistributionPeriod {
        DistributionPeriod::new(Uint::from(start), Uint::from(end))
    }

    #[test]
    fn test_twa_two_step_integral() {
        // Period [1000, 2000), trove created before the period, snapshots at
        // 1000 (value 100) and 1500 (value 300):
        // weighted sum = 100*500 + 300*500 = 200000, active time 1000.
        let trove = trove(500, None, 999);
        let snapshots = vec![snapshot(100, 1000), snapshot(300, 1500)];

        let twa = compute_twa(&trove, &snapshots, &period(1000, 2000));
        assert_eq!(twa.active_time, Uint::from(1000u64));
        assert_eq!(twa.time_weighted_average, Uint::from(200u64));
    }

    #[test]
    fn test_twa_fallback_to_deposit_without_snapshots() {
        // Created mid-period, no snapshots: TWA equals current deposit over
        // the clamped window.
        let trove = trove(1500, None, 50);

        let twa = compute_twa(&trove, &[], &period(1000, 2000));
        assert_eq!(twa.active_time, Uint::from(500u64));
        assert_eq!(twa.time_weighted_average, Uint::from(50u64));
    }

    #[test]
    fn test_twa_fallback_when_snapshots_outside_window() {
        // Snapshots exist but none inside the active window.
        let trove = trove(1500, None, 50);
        let snapshots = vec![snapshot(777, 100), snapshot(888, 900)];

        let twa = compute_twa(&trove, &snapshots, &period(1000, 2000));
        assert_eq!(twa.time_weighted_average, Uint::from(50u64));
        assert_eq!(twa.active_time, Uint::from(500u64));
    }

    #[test]
    fn test_twa_zero_window_created_after_period() {
        let trove = trove(2000, None, 100);
        let twa = compute_twa(&trove, &[], &period(1000, 2000));
        assert_eq!(twa.time_weighted_average, Uint::zero());
        assert_eq!(twa.active_time, Uint::zero());
    }

    #[test]
    fn test_twa_zero_window_closed_before_period() {
        let trove = trove(100, Some(1000), 100);
        let twa = compute_twa(&trove, &[], &period(1000, 2000));
        assert_eq!(twa.time_weighted_average, Uint::zero());
        assert_eq!(twa.active_time, Uint::zero());
    }

    #[test]
    fn test_twa_degenerate_period() {
        let trove = trove(100, None, 100);
        let twa = compute_twa(&trove, &[], &period(1000, 1000));
        assert_eq!(twa.active_time, Uint::zero());
        assert_eq!(twa.time_weighted_average, Uint::zero());
    }

    #[test]
    fn test_twa_clamps_to_close_time() {
        // Closed mid-period; active window is [1000, 1500).
        let trove = trove(500, Some(1500), 80);
        let twa = compute_twa(&trove, &[], &period(1000, 2000));
        assert_eq!(twa.active_time, Uint::from(500u64));
        assert_eq!(twa.time_weighted_average, Uint::from(80u64));
    }

    #[test]
    fn test_twa_duplicate_timestamps_last_write_wins() {
        // Two snapshots at the window entry; the later row's value holds the
        // first segment.
        let trove = trove(500, None, 0);
        let snapshots = vec![snapshot(100, 1000), snapshot(200, 1000), snapshot(400, 1500)];

        let twa = compute_twa(&trove, &snapshots, &period(1000, 2000));
        // 200*500 + 400*500 = 300000 over 1000.
        assert_eq!(twa.time_weighted_average, Uint::from(300u64));
    }

    #[test]
    fn test_twa_bounds_within_observed_values() {
        let trove = trove(0, None, 0);
        let snapshots = vec![snapshot(10, 1100), snapshot(90, 1400), snapshot(40, 1900)];

        let twa = compute_twa(&trove, &snapshots, &period(1000, 2000));
        assert!(twa.time_weighted_average >= Uint::from(10u64));
        assert!(twa.time_weighted_average <= Uint::from(90u64));
    }

    #[test]
    fn test_twa_floor_division() {
        // 100 for 1 second, 0 for 2 seconds: 100/3 floors to 33.
        let trove = trove(0, None, 0);
        let snapshots = vec![snapshot(100, 1000), snapshot(0, 1001)];

        let twa = compute_twa(&trove, &snapshots, &period(1000, 1003));
        assert_eq!(twa.active_time, Uint::from(3u64));
        assert_eq!(twa.time_weighted_average, Uint::from(33u64));
    }

    #[test]
    fn test_twa_batch_uses_snapshot_map() {
        let a = Trove {
            id: TroveId::new("0:a"),
            ..trove(0, None, 7)
        };
        let b = Trove {
            id: TroveId::new("0:b"),
            ..trove(0, None, 9)
        };
        let mut map = HashMap::new();
        map.insert(
            TroveId::new("0:a"),
            vec![CollateralSnapshot {
                trove_id: TroveId::new("0:a"),
                deposit: Uint::from(20u64),
                timestamp: Uint::from(1000u64),
            }],
        );

        let twas = compute_twa_for_troves(&[a, b], &map, &period(1000, 2000));
        assert_eq!(twas[0].time_weighted_average, Uint::from(20u64));
        // Trove b is absent from the map: fallback to deposit.
        assert_eq!(twas[1].time_weighted_average, Uint::from(9u64));
    }
}
