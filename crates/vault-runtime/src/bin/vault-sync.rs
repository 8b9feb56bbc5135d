use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use vault_runtime::{init_logging, load_seed, sync_replicas, LedgerVault, VaultConfig};
use vault_state::{EqualVersionPolicy, MemoryKeyData};
use vault_transport::WsTransport;

#[derive(Parser, Debug)]
#[command(name = "vault-sync")]
#[command(author, version, about = "Reconcile a local replica with a ledger data vault", long_about = None)]
struct Args {
    /// JSON configuration file; VAULT_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file of key -> {value, version} seeding the local replica
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Tie-break for equal versions (local_wins, remote_wins, report)
    #[arg(long)]
    policy: Option<EqualVersionPolicy>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = VaultConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(seed) = args.seed {
        config.seed_file = Some(seed);
    }
    if let Some(policy) = args.policy {
        config.equal_version_policy = policy;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.logging.json_format |= args.json_logs;
    config.validate()?;

    init_logging(&config.logging)?;

    let seed = match &config.seed_file {
        Some(path) => load_seed(path)?,
        None => Default::default(),
    };
    let local = Arc::new(MemoryKeyData::from_replica(seed));
    info!(vault = %config.identity(), entries = local.len(), "local replica ready");

    let transport = WsTransport::connect(&config.url)
        .await
        .with_context(|| format!("connecting to {}", config.url))?;
    let remote = Arc::new(LedgerVault::from_config(&config, transport)?);

    let report = sync_replicas(local, remote, config.equal_version_policy).await?;

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
