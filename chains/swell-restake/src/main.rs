use swell_restake::batch::BatchOrchestrator;
use swell_restake::chain::EthersConnector;
use swell_restake::config::RestakeConfig;
use swell_restake::exchange::{ExchangeWithdrawalManager, OkxClient};
use swell_restake::task::ChainActionRunner;
use swell_restake::utils::GasGate;

use anyhow::{Context, Result};
use clap::Parser;
use core_logic::{setup_logger, Delayer, RandomDelay, WalletManager};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/swell-restake/config.toml")]
    config: String,
    #[arg(long, default_value = "logs.log")]
    log_file: String,
    /// Print the loaded wallets and exit without touching the network
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    // Dropping the guard flushes the file log
    let _log_guard = setup_logger(&args.log_file)?;

    if let Err(e) = run(args).await {
        error!("{:#}", e);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    info!("Loading config from: {}", args.config);
    let config = RestakeConfig::load(&args.config)?;
    config.validate()?;

    let files = &config.files;
    let accounts = WalletManager::load_accounts(&files.private_keys, &files.addresses)
        .context("Failed to load accounts")?;
    info!("Loaded {} wallets", accounts.len());

    if args.list {
        for (i, account) in accounts.iter().enumerate() {
            info!("{:03} -> {}", i + 1, account.destination);
        }
        return Ok(());
    }

    let delayer: Arc<dyn Delayer> = Arc::new(RandomDelay::new());
    let gas = config.gas_config();
    let actions = ChainActionRunner::new(config.contracts, gas.price_bump_percent);
    let gas_gate = GasGate::new(gas, delayer.clone());
    let connector = EthersConnector::new(&config.rpc_url, config.chain_id, config.contracts)
        .context("Failed to initialize RPC provider")?;

    let mut orchestrator = BatchOrchestrator::new(
        config.batch_settings()?,
        Arc::new(connector),
        gas_gate,
        actions,
        delayer.clone(),
    );

    if let Some(credentials) = config.okx_credentials() {
        let client = OkxClient::new(credentials)?;
        let manager = ExchangeWithdrawalManager::new(Arc::new(client), delayer.clone())
            .with_max_attempts(config.okx.max_attempts);
        orchestrator = orchestrator.with_withdrawals(manager);
    }

    let report = orchestrator.run(accounts).await;
    info!(
        "All wallets processed: {} completed, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(())
}
