use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use surety_node::{
    cli::Args,
    config::NodeConfig,
    runtime::builder::{build_runtime, policy_from_config},
    scenario::{payout_ratio_permille, run_scenario},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = if args.config.exists() {
        NodeConfig::load_from_file(&args.config)?
    } else {
        NodeConfig::default()
    };
    args.apply(&mut config);
    config.protocol.validate()?;

    if args.write_config {
        config.save_to_file(&args.config)?;
        println!("Config written to {}", args.config.display());
        return Ok(());
    }

    std::fs::create_dir_all(&args.log_dir)?;
    let file_appender = tracing_appender::rolling::never(&args.log_dir, "audit-consensus.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let audit_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() == "consensus"
                || metadata.target().starts_with("surety_ledger")
                || metadata.target().starts_with("surety_node")
        }));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() != "consensus"
        }));

    tracing_subscriber::registry()
        .with(audit_layer)
        .with(stdout_layer)
        .init();

    info!("--- FLIGHTSURETY ORACLE NETWORK ---");
    info!("Config: {}", args.config.display());

    let policy = policy_from_config(&config)?;
    let runtime = build_runtime(&config, policy).await?;

    let report = match run_scenario(&runtime, &config).await {
        Ok(report) => report,
        Err(e) => {
            error!("Scenario failed: {}", e);
            runtime.shutdown().await;
            return Err(e.into());
        }
    };
    info!("Payout ratio: {}‰", payout_ratio_permille(&report));
    runtime.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
