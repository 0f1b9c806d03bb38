//! In-memory data source for testing without network calls.
//!
//! Applies the same filter semantics as the subgraph queries so pipeline
//! tests exercise realistic result sets.

use super::{SourceError, TroveDataSource};
use crate::domain::{
    Address, ClaimEvent, CollateralId, CollateralSnapshot, DistributionEvent, DistributionPeriod,
    GaugeRecord, StakeEvent, Trove, TroveId, Uint,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Mock data source holding predefined entities.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    gauges: Vec<GaugeRecord>,
    stakes: Vec<StakeEvent>,
    claims: Vec<ClaimEvent>,
    distributions: Vec<DistributionEvent>,
    troves: Vec<Trove>,
    snapshots: Vec<CollateralSnapshot>,
    collateral_by_token: HashMap<Address, Vec<CollateralId>>,
    latest_timestamp: Option<Uint>,
    /// Collateral ids whose trove queries fail, for failure-isolation tests.
    failing_collaterals: HashSet<CollateralId>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gauge(mut self, gauge: GaugeRecord) -> Self {
        self.gauges.push(gauge);
        self
    }

    pub fn with_stake(mut self, stake: StakeEvent) -> Self {
        self.stakes.push(stake);
        self
    }

    pub fn with_claim(mut self, claim: ClaimEvent) -> Self {
        self.claims.push(claim);
        self
    }

    pub fn with_distribution(mut self, distribution: DistributionEvent) -> Self {
        self.distributions.push(distribution);
        self
    }

    pub fn with_trove(mut self, trove: Trove) -> Self {
        self.troves.push(trove);
        self
    }

    pub fn with_snapshot(mut self, snapshot: CollateralSnapshot) -> Self {
        self.snapshots.push(snapshot);
        self
    }

    /// Register a token → collateral branch mapping.
    pub fn with_collateral_mapping(mut self, token: Address, collateral_id: CollateralId) -> Self {
        self.collateral_by_token
            .entry(token)
            .or_default()
            .push(collateral_id);
        self
    }

    pub fn with_latest_timestamp(mut self, timestamp: Uint) -> Self {
        self.latest_timestamp = Some(timestamp);
        self
    }

    /// Make trove queries for the given collateral branch fail with a
    /// network error.
    pub fn with_failing_collateral(mut self, collateral_id: CollateralId) -> Self {
        self.failing_collaterals.insert(collateral_id);
        self
    }

    fn in_window(timestamp: &Uint, window: Option<&DistributionPeriod>) -> bool {
        match window {
            Some(period) => *timestamp >= period.start && *timestamp < period.end,
            None => true,
        }
    }

    fn check_failing(&self, collateral_ids: &[CollateralId]) -> Result<(), SourceError> {
        for id in collateral_ids {
            if self.failing_collaterals.contains(id) {
                return Err(SourceError::Network(format!(
                    "injected failure for collateral {}",
                    id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TroveDataSource for MockSource {
    async fn fetch_gauges(&self) -> Result<Vec<GaugeRecord>, SourceError> {
        Ok(self.gauges.clone())
    }

    async fn fetch_stake_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<StakeEvent>, SourceError> {
        Ok(self
            .stakes
            .iter()
            .filter(|s| Self::in_window(&s.timestamp, window))
            .cloned()
            .collect())
    }

    async fn fetch_claim_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<ClaimEvent>, SourceError> {
        Ok(self
            .claims
            .iter()
            .filter(|c| Self::in_window(&c.timestamp, window))
            .cloned()
            .collect())
    }

    async fn fetch_distribution_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<DistributionEvent>, SourceError> {
        Ok(self
            .distributions
            .iter()
            .filter(|d| Self::in_window(&d.timestamp, window))
            .cloned()
            .collect())
    }

    async fn fetch_open_troves(
        &self,
        collateral_ids: &[CollateralId],
        period: &DistributionPeriod,
    ) -> Result<Vec<Trove>, SourceError> {
        self.check_failing(collateral_ids)?;
        Ok(self
            .troves
            .iter()
            .filter(|t| {
                t.status.is_open()
                    && collateral_ids.contains(&t.collateral_id)
                    && t.created_at < period.end
            })
            .cloned()
            .collect())
    }

    async fn fetch_closed_troves(
        &self,
        collateral_ids: &[CollateralId],
        period: &DistributionPeriod,
    ) -> Result<Vec<Trove>, SourceError> {
        self.check_failing(collateral_ids)?;
        Ok(self
            .troves
            .iter()
            .filter(|t| {
                !t.status.is_open()
                    && collateral_ids.contains(&t.collateral_id)
                    && t.created_at < period.end
                    && t.closed_at.as_ref().is_some_and(|c| *c > period.start)
            })
            .cloned()
            .collect())
    }

    async fn fetch_snapshots(
        &self,
        trove_ids: &[TroveId],
        period: &DistributionPeriod,
    ) -> Result<HashMap<TroveId, Vec<CollateralSnapshot>>, SourceError> {
        let mut by_trove: HashMap<TroveId, Vec<CollateralSnapshot>> = trove_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();

        for snapshot in &self.snapshots {
            if snapshot.timestamp < period.start || snapshot.timestamp > period.end {
                continue;
            }
            if let Some(list) = by_trove.get_mut(&snapshot.trove_id) {
                list.push(snapshot.clone());
            }
        }

        for list in by_trove.values_mut() {
            list.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        }

        Ok(by_trove)
    }

    async fn collateral_ids_for_tokens(
        &self,
        tokens: &[Address],
    ) -> Result<Vec<CollateralId>, SourceError> {
        let mut ids = Vec::new();
        for token in tokens {
            if let Some(mapped) = self.collateral_by_token.get(token) {
                ids.extend(mapped.iter().cloned());
            }
        }
        Ok(ids)
    }

    async fn latest_indexed_timestamp(&self) -> Result<Option<Uint>, SourceError> {
        Ok(self.latest_timestamp.clone())
    }
}
