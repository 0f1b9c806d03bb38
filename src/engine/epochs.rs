//! Gauge epoch resolution.
//!
//! Derives, per gauge, the accounting period and the claim epoch to allocate
//! from the append-only distribution and claim logs. Pure functions over
//! already-fetched events; the maps built here are function-scoped and
//! discarded after the run.

use crate::domain::{
    Address, ClaimEvent, DistributionEvent, DistributionPeriod, GaugeDistributionInfo,
    GaugeRecord, Uint,
};
use std::collections::HashMap;

/// Period start for gauges that have never distributed.
fn origin_timestamp() -> Uint {
    Uint::zero()
}

/// Latest distribution per gauge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestDistribution {
    pub epoch: Uint,
    pub timestamp: Uint,
}

/// Scan all distribution events and keep, per gauge, the entry with the
/// maximum epoch. Epochs are protocol-unique per gauge; if duplicates occur
/// the first maximal entry seen is kept.
pub fn latest_distributed_per_gauge(
    events: &[DistributionEvent],
) -> HashMap<Address, LatestDistribution> {
    let mut latest: HashMap<Address, LatestDistribution> = HashMap::new();

    for event in events {
        match latest.get(&event.gauge) {
            Some(current) if event.epoch <= current.epoch => {}
            _ => {
                latest.insert(
                    event.gauge.clone(),
                    LatestDistribution {
                        epoch: event.epoch.clone(),
                        timestamp: event.timestamp.clone(),
                    },
                );
            }
        }
    }

    latest
}

/// Resolve the accounting context for every gauge.
///
/// Per gauge: latest distributed epoch (0 when no distribution event
/// exists), claim epoch = latest + 1, period = [latest distribution
/// timestamp or origin, current timestamp), total rewards = sum of
/// fee-excluded claims at exactly (gauge, claim epoch). Claims at any other
/// epoch are ignored entirely: only the next un-distributed epoch is
/// eligible.
pub fn resolve_gauge_infos(
    gauges: &[GaugeRecord],
    distributions: &[DistributionEvent],
    claims: &[ClaimEvent],
    current_timestamp: &Uint,
) -> Vec<GaugeDistributionInfo> {
    let latest = latest_distributed_per_gauge(distributions);

    gauges
        .iter()
        .map(|record| {
            let distributed = latest.get(&record.gauge);

            let latest_epoch = distributed
                .map(|d| d.epoch.clone())
                .unwrap_or_else(Uint::zero);
            let claim_epoch = latest_epoch.clone() + Uint::from(1u64);

            let start = distributed
                .map(|d| d.timestamp.clone())
                .unwrap_or_else(origin_timestamp);
            let period = DistributionPeriod::new(start, current_timestamp.clone());

            let total_rewards: Uint = claims
                .iter()
                .filter(|c| c.gauge == record.gauge && c.epoch == claim_epoch)
                .map(|c| c.distributable())
                .sum();

            GaugeDistributionInfo {
                gauge: record.gauge.clone(),
                token: record.token.clone(),
                period,
                latest_distributed_epoch: latest_epoch,
                claim_epoch,
                total_rewards,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge(addr: &str, token: &str) -> GaugeRecord {
        GaugeRecord {
            gauge: Address::new(addr),
            token: Address::new(token),
        }
    }

    fn distribution(gauge: &str, epoch: u64, timestamp: u64) -> DistributionEvent {
        DistributionEvent {
            gauge: Address::new(gauge),
            epoch: Uint::from(epoch),
            recipients: Uint::from(1u64),
            total_reward_amount: Uint::from(100u64),
            timestamp: Uint::from(timestamp),
        }
    }

    fn claim(gauge: &str, epoch: u64, total: u64, fee: u64, timestamp: u64) -> ClaimEvent {
        ClaimEvent {
            gauge: Address::new(gauge),
            total: Uint::from(total),
            claim_fee: Uint::from(fee),
            epoch: Uint::from(epoch),
            block_number: Uint::from(1u64),
            timestamp: Uint::from(timestamp),
            transaction_hash: "0xtx".to_string(),
        }
    }

    #[test]
    fn test_latest_distribution_keeps_max_epoch() {
        let events = vec![
            distribution("0xg", 1, 100),
            distribution("0xg", 3, 300),
            distribution("0xg", 2, 200),
            distribution("0xother", 7, 700),
        ];

        let latest = latest_distributed_per_gauge(&events);
        assert_eq!(latest[&Address::new("0xg")].epoch, Uint::from(3u64));
        assert_eq!(latest[&Address::new("0xg")].timestamp, Uint::from(300u64));
        assert_eq!(latest[&Address::new("0xother")].epoch, Uint::from(7u64));
    }

    #[test]
    fn test_resolve_sums_only_claim_epoch() {
        // Latest distributed epoch 2 → claim epoch 3. The epoch-2 claim is
        // excluded from all accounting; epoch-3 claim contributes total - fee.
        let gauges = vec![gauge("0xg", "0xt")];
        let distributions = vec![distribution("0xg", 2, 1000)];
        let claims = vec![
            claim("0xg", 2, 1000, 0, 1100),
            claim("0xg", 3, 500, 50, 1200),
        ];

        let infos = resolve_gauge_infos(&gauges, &distributions, &claims, &Uint::from(2000u64));
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].latest_distributed_epoch, Uint::from(2u64));
        assert_eq!(infos[0].claim_epoch, Uint::from(3u64));
        assert_eq!(infos[0].total_rewards, Uint::from(450u64));
        assert_eq!(infos[0].period.start, Uint::from(1000u64));
        assert_eq!(infos[0].period.end, Uint::from(2000u64));
    }

    #[test]
    fn test_resolve_without_distribution_events() {
        let gauges = vec![gauge("0xg", "0xt")];
        let claims = vec![claim("0xg", 1, 200, 20, 500)];

        let infos = resolve_gauge_infos(&gauges, &[], &claims, &Uint::from(1000u64));
        assert_eq!(infos[0].latest_distributed_epoch, Uint::zero());
        assert_eq!(infos[0].claim_epoch, Uint::from(1u64));
        // Period starts at the origin.
        assert_eq!(infos[0].period.start, Uint::zero());
        assert_eq!(infos[0].total_rewards, Uint::from(180u64));
    }

    #[test]
    fn test_resolve_ignores_other_gauges_claims() {
        let gauges = vec![gauge("0xg", "0xt")];
        let claims = vec![claim("0xother", 1, 999, 0, 500)];

        let infos = resolve_gauge_infos(&gauges, &[], &claims, &Uint::from(1000u64));
        assert_eq!(infos[0].total_rewards, Uint::zero());
    }

    #[test]
    fn test_resolve_clamps_future_distribution_timestamp() {
        // A distribution indexed after the current timestamp would invert the
        // period; the period constructor clamps it to degenerate.
        let gauges = vec![gauge("0xg", "0xt")];
        let distributions = vec![distribution("0xg", 1, 5000)];

        let infos = resolve_gauge_infos(&gauges, &distributions, &[], &Uint::from(2000u64));
        assert_eq!(infos[0].period.start, Uint::from(2000u64));
        assert_eq!(infos[0].period.end, Uint::from(2000u64));
    }

    #[test]
    fn test_resolve_sums_multiple_claims_same_epoch() {
        let gauges = vec![gauge("0xg", "0xt")];
        let claims = vec![
            claim("0xg", 1, 100, 10, 100),
            claim("0xg", 1, 200, 20, 200),
        ];

        let infos = resolve_gauge_infos(&gauges, &[], &claims, &Uint::from(1000u64));
        assert_eq!(infos[0].total_rewards, Uint::from(270u64));
    }
}
