use anyhow::Context;
use std::sync::Arc;
use trove_rewards::{Config, Orchestrator, RpcClient, SubgraphClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        subgraph = %config.subgraph_url,
        reward_manager = %config.reward_manager_address,
        start_block = %config.start_block,
        "starting distribution run"
    );

    let source = Arc::new(SubgraphClient::new(config.subgraph_url.clone()));
    let rpc = Arc::new(RpcClient::new(config.rpc_url.clone()));
    let orchestrator = Orchestrator::new(source).with_rpc(rpc);

    let run = match config.override_period() {
        Some(period) => orchestrator
            .run_for_period(period)
            .await
            .context("distribution run with explicit period failed")?,
        None => orchestrator.run().await.context("distribution run failed")?,
    };

    let json = serde_json::to_string_pretty(&run).context("failed to serialize run report")?;
    println!("{}", json);

    Ok(())
}
