//! Data source abstraction for fetching indexed events, troves, and
//! collateral snapshots.
//!
//! Implementations own cursor pagination and eager conversion of the
//! indexer's stringly-typed rows into domain entities. They are fail-fast: a
//! transport, HTTP, or parse error aborts the enclosing fetch with no partial
//! results, and no retry happens inside this layer.

use crate::domain::{
    Address, ClaimEvent, CollateralId, CollateralSnapshot, DistributionEvent, DistributionPeriod,
    GaugeRecord, StakeEvent, Trove, TroveId, Uint,
};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub mod mock;
pub mod pagination;
pub mod rpc;
pub mod subgraph;

pub use mock::MockSource;
pub use rpc::RpcClient;
pub use subgraph::SubgraphClient;

/// Error type for data source operations. Any variant is fatal to the fetch
/// that produced it.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Transport failure (connection, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// Non-success HTTP status from the query service or RPC node.
    #[error("http error {status}: {message}")]
    Http { status: u16, message: String },
    /// The query service returned a GraphQL-level error or no data.
    #[error("query error: {0}")]
    Query(String),
    /// The RPC node returned a JSON-RPC error object.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// A row did not match the expected schema or a numeric field failed to
    /// parse.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Read access to the indexed entities backing a distribution run.
///
/// All event fetches return complete, cursor-ordered result sets; optional
/// `window` filters restrict by `timestamp >= start && timestamp < end`
/// server-side without affecting pagination correctness.
#[async_trait]
pub trait TroveDataSource: Send + Sync {
    /// All known gauge-to-collateral-token mappings.
    async fn fetch_gauges(&self) -> Result<Vec<GaugeRecord>, SourceError>;

    /// Staked events, optionally restricted to a time window.
    async fn fetch_stake_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<StakeEvent>, SourceError>;

    /// Claimed events, optionally restricted to a time window.
    async fn fetch_claim_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<ClaimEvent>, SourceError>;

    /// Distribution (payout) events, optionally restricted to a time window.
    async fn fetch_distribution_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<DistributionEvent>, SourceError>;

    /// Troves with status open created before `period.end`, scoped to the
    /// given collateral branches.
    async fn fetch_open_troves(
        &self,
        collateral_ids: &[CollateralId],
        period: &DistributionPeriod,
    ) -> Result<Vec<Trove>, SourceError>;

    /// Troves with status other than open, created before `period.end` and
    /// closed after `period.start`, scoped to the given collateral branches.
    async fn fetch_closed_troves(
        &self,
        collateral_ids: &[CollateralId],
        period: &DistributionPeriod,
    ) -> Result<Vec<Trove>, SourceError>;

    /// Collateral snapshots with `period.start <= timestamp <= period.end`
    /// for the given troves, grouped per trove and sorted ascending by
    /// timestamp. Every requested trove id is present in the map, possibly
    /// with an empty list.
    async fn fetch_snapshots(
        &self,
        trove_ids: &[TroveId],
        period: &DistributionPeriod,
    ) -> Result<HashMap<TroveId, Vec<CollateralSnapshot>>, SourceError>;

    /// Collateral branch ids whose registered token address is one of the
    /// given tokens.
    async fn collateral_ids_for_tokens(
        &self,
        tokens: &[Address],
    ) -> Result<Vec<CollateralId>, SourceError>;

    /// Timestamp of the most recently indexed event across all event types,
    /// or `None` if nothing is indexed yet.
    async fn latest_indexed_timestamp(&self) -> Result<Option<Uint>, SourceError>;
}
