pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod orchestration;
pub mod query;

pub use config::Config;
pub use datasource::{MockSource, RpcClient, SourceError, SubgraphClient, TroveDataSource};
pub use domain::{
    Address, ClaimEvent, CollateralId, CollateralSnapshot, DistributionEvent, DistributionPeriod,
    DistributionRun, GaugeDistribution, GaugeOutcome, GaugeRecord, GaugeStatus, SkipReason,
    StakeEvent, Trove, TroveDistribution, TroveId, TroveStatus, TroveTwa, Uint,
};
pub use orchestration::{OrchestrationError, Orchestrator};
pub use query::TroveQueryService;
