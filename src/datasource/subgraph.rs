//! GraphQL subgraph client implementation.
//!
//! Every fetch is a fixed, cursor-paginated query against the indexer's
//! schema. Rows arrive with string-typed numeric fields and are converted to
//! domain entities before leaving this module.

use super::pagination::{collect_pages, Cursored, PAGE_SIZE};
use super::{SourceError, TroveDataSource};
use crate::domain::{
    Address, ClaimEvent, CollateralId, CollateralSnapshot, DistributionEvent, DistributionPeriod,
    GaugeRecord, StakeEvent, Trove, TroveId, TroveStatus, Uint,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Troves per `trove_in` filter when fetching snapshots. Keeps the query
/// variable payload within the indexer's limits.
const SNAPSHOT_TROVE_ID_BATCH: usize = 100;

const GAUGES_QUERY: &str = "
query Gauges($cursor: ID!, $limit: Int!) {
  aeroGauges(where: { id_gt: $cursor }, orderBy: id, orderDirection: asc, first: $limit) {
    id
    gauge
    token
  }
}
";

const STAKES_QUERY: &str = "
query Stakes($cursor: ID!, $limit: Int!, $start: BigInt, $end: BigInt) {
  aeroStakes(
    where: { id_gt: $cursor, timestamp_gte: $start, timestamp_lt: $end }
    orderBy: id
    orderDirection: asc
    first: $limit
  ) {
    id
    gauge
    token
    amount
    blockNumber
    timestamp
    transactionHash
  }
}
";

const CLAIMS_QUERY: &str = "
query Claims($cursor: ID!, $limit: Int!, $start: BigInt, $end: BigInt) {
  aeroClaims(
    where: { id_gt: $cursor, timestamp_gte: $start, timestamp_lt: $end }
    orderBy: id
    orderDirection: asc
    first: $limit
  ) {
    id
    gauge
    total
    claimFee
    epoch
    blockNumber
    timestamp
    transactionHash
  }
}
";

const DISTRIBUTIONS_QUERY: &str = "
query Distributions($cursor: ID!, $limit: Int!, $start: BigInt, $end: BigInt) {
  aeroDistributions(
    where: { id_gt: $cursor, timestamp_gte: $start, timestamp_lt: $end }
    orderBy: id
    orderDirection: asc
    first: $limit
  ) {
    id
    gauge
    recipients
    totalRewardAmount
    epoch
    timestamp
  }
}
";

const OPEN_TROVES_QUERY: &str = "
query OpenTroves($collateralIds: [String!]!, $periodEnd: BigInt!, $cursor: ID!, $limit: Int!) {
  troves(
    where: {
      status: active
      collateral_in: $collateralIds
      createdAt_lt: $periodEnd
      id_gt: $cursor
    }
    orderBy: id
    orderDirection: asc
    first: $limit
  ) {
    id
    borrower
    collateral { id }
    deposit
    createdAt
    closedAt
    status
  }
}
";

const CLOSED_TROVES_QUERY: &str = "
query ClosedTroves($collateralIds: [String!]!, $periodStart: BigInt!, $periodEnd: BigInt!, $cursor: ID!, $limit: Int!) {
  troves(
    where: {
      status_not: active
      collateral_in: $collateralIds
      createdAt_lt: $periodEnd
      closedAt_gt: $periodStart
      id_gt: $cursor
    }
    orderBy: id
    orderDirection: asc
    first: $limit
  ) {
    id
    borrower
    collateral { id }
    deposit
    createdAt
    closedAt
    status
  }
}
";

const SNAPSHOTS_QUERY: &str = "
query TroveSnapshots($troveIds: [String!]!, $start: BigInt!, $end: BigInt!, $cursor: ID!, $limit: Int!) {
  troveSnapshots(
    where: { trove_in: $troveIds, timestamp_gte: $start, timestamp_lte: $end, id_gt: $cursor }
    orderBy: id
    orderDirection: asc
    first: $limit
  ) {
    id
    trove { id }
    deposit
    timestamp
  }
}
";

const COLLATERALS_BY_TOKEN_QUERY: &str = "
query CollateralsByToken($tokens: [Bytes!]!) {
  collateralAddresses(where: { token_in: $tokens }) {
    collateral { id }
    token
  }
}
";

const LATEST_TIMESTAMPS_QUERY: &str = "
query LatestTimestamps {
  aeroClaims(first: 1, orderBy: timestamp, orderDirection: desc) { timestamp }
  aeroStakes(first: 1, orderBy: timestamp, orderDirection: desc) { timestamp }
  aeroDistributions(first: 1, orderBy: timestamp, orderDirection: desc) { timestamp }
}
";

/// Subgraph-backed data source.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope<T> {
    data: Option<T>,
    errors: Option<serde_json::Value>,
}

impl SubgraphClient {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    /// POST one GraphQL query and unwrap the response envelope. GraphQL-level
    /// errors and missing data are both hard failures.
    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, SourceError> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: GraphQlEnvelope<T> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(errors) = envelope.errors {
            return Err(SourceError::Query(errors.to_string()));
        }
        envelope
            .data
            .ok_or_else(|| SourceError::Query("no data returned".to_string()))
    }

    /// Time-window variables shared by the event queries. Absent filters are
    /// passed as null, which the indexer ignores.
    fn window_bounds(window: Option<&DistributionPeriod>) -> (Option<String>, Option<String>) {
        match window {
            Some(period) => (
                Some(period.start.to_canonical_string()),
                Some(period.end.to_canonical_string()),
            ),
            None => (None, None),
        }
    }
}

fn parse_uint(field: &str, value: &str) -> Result<Uint, SourceError> {
    Uint::from_str_canonical(value)
        .map_err(|_| SourceError::Parse(format!("invalid {}: {:?}", field, value)))
}

#[derive(Debug, Deserialize)]
struct GaugeRow {
    id: String,
    gauge: String,
    token: String,
}

impl Cursored for GaugeRow {
    fn cursor(&self) -> &str {
        &self.id
    }
}

impl From<GaugeRow> for GaugeRecord {
    fn from(row: GaugeRow) -> Self {
        GaugeRecord {
            gauge: Address::new(row.gauge),
            token: Address::new(row.token),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StakeRow {
    id: String,
    gauge: String,
    token: String,
    amount: String,
    block_number: String,
    timestamp: String,
    transaction_hash: String,
}

impl Cursored for StakeRow {
    fn cursor(&self) -> &str {
        &self.id
    }
}

impl TryFrom<StakeRow> for StakeEvent {
    type Error = SourceError;

    fn try_from(row: StakeRow) -> Result<Self, SourceError> {
        Ok(StakeEvent {
            gauge: Address::new(row.gauge),
            token: Address::new(row.token),
            amount: parse_uint("amount", &row.amount)?,
            block_number: parse_uint("blockNumber", &row.block_number)?,
            timestamp: parse_uint("timestamp", &row.timestamp)?,
            transaction_hash: row.transaction_hash,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimRow {
    id: String,
    gauge: String,
    total: String,
    claim_fee: String,
    epoch: String,
    block_number: String,
    timestamp: String,
    transaction_hash: String,
}

impl Cursored for ClaimRow {
    fn cursor(&self) -> &str {
        &self.id
    }
}

impl TryFrom<ClaimRow> for ClaimEvent {
    type Error = SourceError;

    fn try_from(row: ClaimRow) -> Result<Self, SourceError> {
        Ok(ClaimEvent {
            gauge: Address::new(row.gauge),
            total: parse_uint("total", &row.total)?,
            claim_fee: parse_uint("claimFee", &row.claim_fee)?,
            epoch: parse_uint("epoch", &row.epoch)?,
            block_number: parse_uint("blockNumber", &row.block_number)?,
            timestamp: parse_uint("timestamp", &row.timestamp)?,
            transaction_hash: row.transaction_hash,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DistributionRow {
    id: String,
    gauge: String,
    recipients: String,
    total_reward_amount: String,
    epoch: String,
    timestamp: String,
}

impl Cursored for DistributionRow {
    fn cursor(&self) -> &str {
        &self.id
    }
}

impl TryFrom<DistributionRow> for DistributionEvent {
    type Error = SourceError;

    fn try_from(row: DistributionRow) -> Result<Self, SourceError> {
        Ok(DistributionEvent {
            gauge: Address::new(row.gauge),
            epoch: parse_uint("epoch", &row.epoch)?,
            recipients: parse_uint("recipients", &row.recipients)?,
            total_reward_amount: parse_uint("totalRewardAmount", &row.total_reward_amount)?,
            timestamp: parse_uint("timestamp", &row.timestamp)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EntityRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TroveRow {
    id: String,
    borrower: String,
    collateral: EntityRef,
    deposit: String,
    created_at: String,
    closed_at: Option<String>,
    status: String,
}

impl Cursored for TroveRow {
    fn cursor(&self) -> &str {
        &self.id
    }
}

impl TryFrom<TroveRow> for Trove {
    type Error = SourceError;

    fn try_from(row: TroveRow) -> Result<Self, SourceError> {
        let closed_at = row
            .closed_at
            .as_deref()
            .map(|v| parse_uint("closedAt", v))
            .transpose()?;
        let status: TroveStatus = row
            .status
            .parse()
            .map_err(|e: crate::domain::TroveStatusParseError| SourceError::Parse(e.to_string()))?;

        Ok(Trove {
            id: TroveId::new(row.id),
            borrower: Address::new(row.borrower),
            collateral_id: CollateralId::new(row.collateral.id),
            deposit: parse_uint("deposit", &row.deposit)?,
            created_at: parse_uint("createdAt", &row.created_at)?,
            closed_at,
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    id: String,
    trove: EntityRef,
    deposit: String,
    timestamp: String,
}

impl Cursored for SnapshotRow {
    fn cursor(&self) -> &str {
        &self.id
    }
}

impl TryFrom<SnapshotRow> for CollateralSnapshot {
    type Error = SourceError;

    fn try_from(row: SnapshotRow) -> Result<Self, SourceError> {
        Ok(CollateralSnapshot {
            trove_id: TroveId::new(row.trove.id),
            deposit: parse_uint("deposit", &row.deposit)?,
            timestamp: parse_uint("timestamp", &row.timestamp)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GaugesData {
    #[serde(rename = "aeroGauges")]
    gauges: Vec<GaugeRow>,
}

#[derive(Debug, Deserialize)]
struct StakesData {
    #[serde(rename = "aeroStakes")]
    stakes: Vec<StakeRow>,
}

#[derive(Debug, Deserialize)]
struct ClaimsData {
    #[serde(rename = "aeroClaims")]
    claims: Vec<ClaimRow>,
}

#[derive(Debug, Deserialize)]
struct DistributionsData {
    #[serde(rename = "aeroDistributions")]
    distributions: Vec<DistributionRow>,
}

#[derive(Debug, Deserialize)]
struct TrovesData {
    troves: Vec<TroveRow>,
}

#[derive(Debug, Deserialize)]
struct SnapshotsData {
    #[serde(rename = "troveSnapshots")]
    snapshots: Vec<SnapshotRow>,
}

#[derive(Debug, Deserialize)]
struct CollateralAddressRow {
    collateral: EntityRef,
}

#[derive(Debug, Deserialize)]
struct CollateralAddressesData {
    #[serde(rename = "collateralAddresses")]
    collateral_addresses: Vec<CollateralAddressRow>,
}

#[derive(Debug, Deserialize)]
struct TimestampHead {
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct LatestTimestampsData {
    #[serde(rename = "aeroClaims")]
    claims: Vec<TimestampHead>,
    #[serde(rename = "aeroStakes")]
    stakes: Vec<TimestampHead>,
    #[serde(rename = "aeroDistributions")]
    distributions: Vec<TimestampHead>,
}

#[async_trait]
impl TroveDataSource for SubgraphClient {
    async fn fetch_gauges(&self) -> Result<Vec<GaugeRecord>, SourceError> {
        let rows = collect_pages(PAGE_SIZE, |cursor| {
            let variables = serde_json::json!({ "cursor": cursor, "limit": PAGE_SIZE });
            async move {
                let data: GaugesData = self.query(GAUGES_QUERY, variables).await?;
                Ok(data.gauges)
            }
        })
        .await?;

        debug!(count = rows.len(), "fetched gauges");
        Ok(rows.into_iter().map(GaugeRecord::from).collect())
    }

    async fn fetch_stake_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<StakeEvent>, SourceError> {
        let (start, end) = Self::window_bounds(window);
        let rows = collect_pages(PAGE_SIZE, |cursor| {
            let variables = serde_json::json!({
                "cursor": cursor,
                "limit": PAGE_SIZE,
                "start": start.clone(),
                "end": end.clone(),
            });
            async move {
                let data: StakesData = self.query(STAKES_QUERY, variables).await?;
                Ok(data.stakes)
            }
        })
        .await?;

        debug!(count = rows.len(), "fetched stake events");
        rows.into_iter().map(StakeEvent::try_from).collect()
    }

    async fn fetch_claim_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<ClaimEvent>, SourceError> {
        let (start, end) = Self::window_bounds(window);
        let rows = collect_pages(PAGE_SIZE, |cursor| {
            let variables = serde_json::json!({
                "cursor": cursor,
                "limit": PAGE_SIZE,
                "start": start.clone(),
                "end": end.clone(),
            });
            async move {
                let data: ClaimsData = self.query(CLAIMS_QUERY, variables).await?;
                Ok(data.claims)
            }
        })
        .await?;

        debug!(count = rows.len(), "fetched claim events");
        rows.into_iter().map(ClaimEvent::try_from).collect()
    }

    async fn fetch_distribution_events(
        &self,
        window: Option<&DistributionPeriod>,
    ) -> Result<Vec<DistributionEvent>, SourceError> {
        let (start, end) = Self::window_bounds(window);
        let rows = collect_pages(PAGE_SIZE, |cursor| {
            let variables = serde_json::json!({
                "cursor": cursor,
                "limit": PAGE_SIZE,
                "start": start.clone(),
                "end": end.clone(),
            });
            async move {
                let data: DistributionsData = self.query(DISTRIBUTIONS_QUERY, variables).await?;
                Ok(data.distributions)
            }
        })
        .await?;

        debug!(count = rows.len(), "fetched distribution events");
        rows.into_iter().map(DistributionEvent::try_from).collect()
    }

    async fn fetch_open_troves(
        &self,
        collateral_ids: &[CollateralId],
        period: &DistributionPeriod,
    ) -> Result<Vec<Trove>, SourceError> {
        let ids: Vec<&str> = collateral_ids.iter().map(|c| c.as_str()).collect();
        let rows = collect_pages(PAGE_SIZE, |cursor| {
            let variables = serde_json::json!({
                "collateralIds": ids,
                "periodEnd": period.end.to_canonical_string(),
                "cursor": cursor,
                "limit": PAGE_SIZE,
            });
            async move {
                let data: TrovesData = self.query(OPEN_TROVES_QUERY, variables).await?;
                Ok(data.troves)
            }
        })
        .await?;

        debug!(count = rows.len(), "fetched open troves");
        rows.into_iter().map(Trove::try_from).collect()
    }

    async fn fetch_closed_troves(
        &self,
        collateral_ids: &[CollateralId],
        period: &DistributionPeriod,
    ) -> Result<Vec<Trove>, SourceError> {
        let ids: Vec<&str> = collateral_ids.iter().map(|c| c.as_str()).collect();
        let rows = collect_pages(PAGE_SIZE, |cursor| {
            let variables = serde_json::json!({
                "collateralIds": ids,
                "periodStart": period.start.to_canonical_string(),
                "periodEnd": period.end.to_canonical_string(),
                "cursor": cursor,
                "limit": PAGE_SIZE,
            });
            async move {
                let data: TrovesData = self.query(CLOSED_TROVES_QUERY, variables).await?;
                Ok(data.troves)
            }
        })
        .await?;

        debug!(count = rows.len(), "fetched closed troves");
        rows.into_iter().map(Trove::try_from).collect()
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

        for batch in trove_ids.chunks(SNAPSHOT_TROVE_ID_BATCH) {
            let ids: Vec<&str> = batch.iter().map(|t| t.as_str()).collect();
            let rows = collect_pages(PAGE_SIZE, |cursor| {
                let variables = serde_json::json!({
                    "troveIds": ids,
                    "start": period.start.to_canonical_string(),
                    "end": period.end.to_canonical_string(),
                    "cursor": cursor,
                    "limit": PAGE_SIZE,
                });
                async move {
                    let data: SnapshotsData = self.query(SNAPSHOTS_QUERY, variables).await?;
                    Ok(data.snapshots)
                }
            })
            .await?;

            for row in rows {
                let snapshot = CollateralSnapshot::try_from(row)?;
                if let Some(list) = by_trove.get_mut(&snapshot.trove_id) {
                    list.push(snapshot);
                }
            }
        }

        // Rows arrive in cursor order; downstream requires timestamp order.
        for list in by_trove.values_mut() {
            list.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        }

        Ok(by_trove)
    }

    async fn collateral_ids_for_tokens(
        &self,
        tokens: &[Address],
    ) -> Result<Vec<CollateralId>, SourceError> {
        // The subgraph stores addresses as lowercase hex; Address already
        // normalizes.
        let lower: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
        let variables = serde_json::json!({ "tokens": lower });
        let data: CollateralAddressesData =
            self.query(COLLATERALS_BY_TOKEN_QUERY, variables).await?;

        Ok(data
            .collateral_addresses
            .into_iter()
            .map(|row| CollateralId::new(row.collateral.id))
            .collect())
    }

    async fn latest_indexed_timestamp(&self) -> Result<Option<Uint>, SourceError> {
        let data: LatestTimestampsData = self
            .query(LATEST_TIMESTAMPS_QUERY, serde_json::json!({}))
            .await?;

        let mut latest: Option<Uint> = None;
        for head in data
            .claims
            .iter()
            .chain(data.stakes.iter())
            .chain(data.distributions.iter())
        {
            let ts = parse_uint("timestamp", &head.timestamp)?;
            latest = Some(match latest {
                Some(current) => current.max(ts),
                None => ts,
            });
        }

        Ok(latest)
    }
}
