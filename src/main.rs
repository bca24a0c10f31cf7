//! Two-venue DEX arbitrage bot entry point.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dex_arb::arbitrage::OpportunityPipeline;
use dex_arb::chain::{watch_swaps, ChainApi, EvmChain};
use dex_arb::config::{Config, PairFile};
use dex_arb::units::{self, NATIVE_DECIMALS};
use dex_arb::venue::PairRegistry;

/// Two-venue DEX arbitrage bot.
#[derive(Parser, Debug)]
#[command(name = "dex-arb")]
#[command(about = "Watches two DEX pools per pair and arbitrages price divergence")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the main bot loop (default).
    Run,

    /// Check configuration and pair file validity.
    CheckConfig,

    /// Check wallet balance and RPC connection.
    CheckBalance,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("dex_arb=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::CheckBalance) => cmd_check_balance().await,
        Some(Command::Run) | None => cmd_run().await,
    }
}

/// Check configuration and pair file validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DEX ARB BOT - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Parse the pair file
    print!("Loading pair file... ");
    let pair_file = match PairFile::load(&config.pairs_file) {
        Ok(f) => {
            println!("OK");
            f
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Pair file load failed"));
        }
    };

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  RPC URL: {}", config.rpc_url);
    println!("  Venue A: {}", pair_file.venue_a.name);
    println!("  Venue B: {}", pair_file.venue_b.name);
    println!("  Monitored pairs: {}", pair_file.pairs.len());
    for pair in &pair_file.pairs {
        println!("    - {} (fee {})", pair.name, pair.fee);
    }
    println!("  Price Difference: {}%", config.price_difference);
    println!("  Liquidity Fraction: {}", config.liquidity_fraction);
    println!("  Gas Limit: {}", config.gas_limit);
    println!("  Gas Price: {}", config.gas_price);
    println!(
        "  Mode: {}",
        if config.is_deployed {
            "LIVE TRADING"
        } else {
            "MONITORING"
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Check wallet balance and RPC connection.
async fn cmd_check_balance() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DEX ARB BOT - BALANCE CHECK");
    println!("======================================================================");

    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!("RPC URL: {}", config.rpc_url);
    println!("Private Key: present");
    println!("======================================================================");

    // Connect
    print!("\n1. Connecting to RPC... ");
    let chain = EvmChain::connect(&config)?;
    println!("OK");
    println!("   Account: {}", chain.account());

    // Probe the endpoint
    print!("\n2. Fetching block number... ");
    match chain.block_number().await {
        Ok(block) => {
            println!("OK");
            println!("   Block: {}", block);
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
            return Err(anyhow::anyhow!("RPC probe failed"));
        }
    }

    // Get balance
    print!("\n3. Fetching native balance... ");
    match chain.native_balance(chain.account()).await {
        Ok(balance) => {
            println!("OK");
            println!(
                "   Balance: {}",
                units::format_units(balance, NATIVE_DECIMALS)
                    .map_err(|e| anyhow::anyhow!(e))?
            );
            println!("   Estimated gas cost per trade: {}", config.estimated_gas_cost());
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    println!("\n======================================================================");
    println!("BALANCE CHECK COMPLETED");
    println!("======================================================================");

    Ok(())
}

/// Run the main bot loop.
async fn cmd_run() -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!(
        "Mode: {}",
        if config.is_deployed {
            "LIVE TRADING"
        } else {
            "MONITORING"
        }
    );

    // Connect and resolve the pair universe
    let chain = EvmChain::connect(&config)?;
    let provider = chain.provider();
    info!("Connected, account {}", chain.account());

    let pair_file = PairFile::load(&config.pairs_file)?;
    let chain: Arc<dyn ChainApi> = Arc::new(chain);
    let registry = PairRegistry::build(chain.as_ref(), &pair_file).await?;

    if registry.is_empty() {
        error!("No monitored pair could be resolved, nothing to do");
        return Err(anyhow::anyhow!("empty pair universe"));
    }

    info!("========================================");
    info!("DEX ARBITRAGE BOT STARTED");
    info!("========================================");
    info!("Venue A: {}", registry.venues().a.name);
    info!("Venue B: {}", registry.venues().b.name);
    for pair in registry.pairs() {
        info!(
            "Pair: {} (fee {}) pools {} / {}",
            pair.name, pair.fee, pair.pool_a, pair.pool_b
        );
    }
    info!("========================================");

    // Start the swap watcher
    let (tx, mut rx) = mpsc::channel(64);
    let watch_registry = registry.clone();
    let watcher = tokio::spawn(async move {
        if let Err(e) = watch_swaps(provider, &watch_registry, tx).await {
            error!("Swap watcher stopped: {}", e);
        }
    });

    let pipeline = Arc::new(OpportunityPipeline::new(
        Arc::clone(&chain),
        registry.venues(),
        Arc::new(config),
    ));

    // Each signal is handled on its own task; the pipeline's
    // single-flight slot drops signals that arrive mid-cycle.
    loop {
        tokio::select! {
            signal = rx.recv() => {
                let Some(signal) = signal else {
                    warn!("Swap channel closed");
                    break;
                };
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(async move {
                    pipeline.handle_swap(&signal).await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    watcher.abort();
    info!("Bot stopped");
    Ok(())
}
