//! Trove query service: which troves were active during a period.

use crate::datasource::{SourceError, TroveDataSource};
use crate::domain::{Address, CollateralId, DistributionPeriod, Trove};
use std::sync::Arc;

/// Answers "which troves were active at any point in the period" for a set
/// of collateral branches.
#[derive(Clone)]
pub struct TroveQueryService {
    source: Arc<dyn TroveDataSource>,
}

impl TroveQueryService {
    pub fn new(source: Arc<dyn TroveDataSource>) -> Self {
        Self { source }
    }

    /// Union of troves still open (created before the period end) and troves
    /// closed during the period (created before end, closed after start).
    ///
    /// The two status-scoped queries are disjoint, so no de-duplication is
    /// needed. They touch independent result sets and run concurrently. The
    /// union is sorted by trove id so downstream output is deterministic
    /// regardless of fetch interleaving.
    pub async fn active_troves_in_period(
        &self,
        collateral_ids: &[CollateralId],
        period: &DistributionPeriod,
    ) -> Result<Vec<Trove>, SourceError> {
        let (open, closed) = futures::try_join!(
            self.source.fetch_open_troves(collateral_ids, period),
            self.source.fetch_closed_troves(collateral_ids, period),
        )?;

        let mut troves = open;
        troves.extend(closed);
        troves.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(troves)
    }

    /// Collateral branch ids registered for the given token addresses.
    pub async fn collateral_ids_for_tokens(
        &self,
        tokens: &[Address],
    ) -> Result<Vec<CollateralId>, SourceError> {
        self.source.collateral_ids_for_tokens(tokens).await
    }
}
