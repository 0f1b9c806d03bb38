use crate::datasource::{RpcClient, SourceError, TroveDataSource};
use crate::domain::{
    DistributionPeriod, DistributionRun, GaugeDistribution, GaugeDistributionInfo, GaugeOutcome,
    GaugeStatus, SkipReason, TroveId, Uint,
};
use crate::engine::{allocate, compute_twa_for_troves, resolve_gauge_infos, total_allocated};
use crate::query::TroveQueryService;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Runs the per-gauge distribution pipeline.
///
/// Gauges are processed independently: a failure in one gauge is recorded as
/// a failed outcome and the run continues, so the report always covers every
/// discovered gauge.
#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn TroveDataSource>,
    troves: TroveQueryService,
    rpc: Option<Arc<RpcClient>>,
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("nothing indexed yet and no RPC client configured to resolve the period end")]
    NoCurrentTimestamp,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn TroveDataSource>) -> Self {
        Self {
            troves: TroveQueryService::new(source.clone()),
            source,
            rpc: None,
        }
    }

    /// Attach a chain RPC client used to resolve the period end when the
    /// subgraph has nothing indexed yet.
    pub fn with_rpc(mut self, rpc: Arc<RpcClient>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    /// Run the full distribution pipeline with per-gauge epoch-derived
    /// periods.
    pub async fn run(&self) -> Result<DistributionRun, OrchestrationError> {
        self.run_inner(None).await
    }

    /// Run the pipeline with an explicit period applied to every gauge.
    /// Claim epochs are still resolved from the event logs.
    pub async fn run_for_period(
        &self,
        period: DistributionPeriod,
    ) -> Result<DistributionRun, OrchestrationError> {
        self.run_inner(Some(period)).await
    }

    async fn run_inner(
        &self,
        override_period: Option<DistributionPeriod>,
    ) -> Result<DistributionRun, OrchestrationError> {
        let gauges = self.source.fetch_gauges().await?;
        info!(count = gauges.len(), "discovered gauges");
        if gauges.is_empty() {
            return Ok(DistributionRun::from_outcomes(Vec::new()));
        }

        let current_timestamp = match &override_period {
            Some(period) => period.end.clone(),
            None => self.current_timestamp().await?,
        };

        let distribution_events = self.source.fetch_distribution_events(None).await?;
        let claim_events = self.source.fetch_claim_events(None).await?;
        let stake_events = self.source.fetch_stake_events(None).await?;
        info!(count = stake_events.len(), "stake activity observed");

        let mut infos = resolve_gauge_infos(
            &gauges,
            &distribution_events,
            &claim_events,
            &current_timestamp,
        );
        if let Some(period) = &override_period {
            for info in &mut infos {
                info.period = period.clone();
            }
        }

        let mut outcomes = Vec::with_capacity(infos.len());
        for info in infos {
            let gauge = info.gauge.clone();
            let status = match self.process_gauge(&info).await {
                Ok(status) => status,
                Err(error) => {
                    warn!(%gauge, %error, "gauge pipeline failed");
                    GaugeStatus::Failed {
                        error: error.to_string(),
                    }
                }
            };
            outcomes.push(GaugeOutcome { gauge, status });
        }

        let mut run = DistributionRun::from_outcomes(outcomes);
        run.summary.stake_events_seen = stake_events.len();
        info!(
            completed = run.summary.gauges_completed,
            skipped = run.summary.gauges_skipped,
            failed = run.summary.gauges_failed,
            troves = run.summary.troves_processed,
            total_allocated = %run.summary.total_allocated,
            "distribution run finished"
        );
        Ok(run)
    }

    /// Period end for epoch-derived runs: the latest indexed event timestamp,
    /// falling back to the chain head when the subgraph is empty.
    async fn current_timestamp(&self) -> Result<Uint, OrchestrationError> {
        if let Some(ts) = self.source.latest_indexed_timestamp().await? {
            return Ok(ts);
        }
        match &self.rpc {
            Some(rpc) => Ok(rpc.latest_block_timestamp().await?),
            None => Err(OrchestrationError::NoCurrentTimestamp),
        }
    }

    async fn process_gauge(
        &self,
        info: &GaugeDistributionInfo,
    ) -> Result<GaugeStatus, SourceError> {
        if info.total_rewards.is_zero() {
            info!(gauge = %info.gauge, epoch = %info.claim_epoch, "no rewards to distribute");
            return Ok(GaugeStatus::Skipped {
                reason: SkipReason::NoRewards,
            });
        }

        let collateral_ids = self
            .troves
            .collateral_ids_for_tokens(std::slice::from_ref(&info.token))
            .await?;
        if collateral_ids.is_empty() {
            info!(gauge = %info.gauge, token = %info.token, "no matching collateral branch");
            return Ok(GaugeStatus::Skipped {
                reason: SkipReason::NoCollateral,
            });
        }

        let troves = self
            .troves
            .active_troves_in_period(&collateral_ids, &info.period)
            .await?;
        if troves.is_empty() {
            info!(gauge = %info.gauge, "no active troves in period");
            return Ok(GaugeStatus::Skipped {
                reason: SkipReason::NoActiveTroves,
            });
        }

        let trove_ids: Vec<TroveId> = troves.iter().map(|t| t.id.clone()).collect();
        let snapshots = self.source.fetch_snapshots(&trove_ids, &info.period).await?;

        let twa_results = compute_twa_for_troves(&troves, &snapshots, &info.period);
        let distributions = allocate(&twa_results, &info.total_rewards);
        let allocated = total_allocated(&distributions);

        info!(
            gauge = %info.gauge,
            epoch = %info.claim_epoch,
            troves = distributions.len(),
            total_rewards = %info.total_rewards,
            allocated = %allocated,
            "gauge distribution computed"
        );

        Ok(GaugeStatus::Completed(GaugeDistribution {
            gauge: info.gauge.clone(),
            token: info.token.clone(),
            period: info.period.clone(),
            latest_distributed_epoch: info.latest_distributed_epoch.clone(),
            claim_epoch: info.claim_epoch.clone(),
            total_rewards: info.total_rewards.clone(),
            total_allocated: allocated,
            distributions,
        }))
    }
}
