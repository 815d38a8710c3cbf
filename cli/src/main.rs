//! ChainCensus CLI — census of smart-contract framework adoption on Cardano.
//!
//! # Commands
//! ```
//! chaincensus count          # classify transactions, print summary + timeline
//! chaincensus collect        # inventory distinct scripts as digest,cbor CSV
//! chaincensus collect-refs   # map output references to inline script digests
//! chaincensus detect-aiken   # flag collected scripts with Aiken UPLC markers
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_collect;
mod cmd_collect_refs;
mod cmd_count;
mod cmd_detect_aiken;
mod config;

use config::RunConfig;

#[derive(Parser)]
#[command(
    name = "chaincensus",
    about = "Framework-adoption census over a Cardano node's chain-sync",
    long_about = "
Streams blocks from an Ogmios endpoint and classifies every script-touching
transaction by the framework its scripts were built with.

ENVIRONMENT VARIABLES:
  NETWORK       mainnet | preprod | preview        (default: mainnet)
  OGMIOS_HOST   Ogmios WebSocket URL               (default: ws://127.0.0.1:1337)
  UNTIL_SLOT    stop slot (requires UNTIL_ID; default: the node's tip)
  UNTIL_ID      block id at the stop slot
  DATA_DIR      directory with the known-script tables  (default: ./data)
",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify transactions and print the adoption summary + epoch timeline
    Count,

    /// Inventory every distinct script in the window as digest,cbor CSV
    Collect,

    /// Emit ["txid#index", digest] pairs for inline scripts on outputs
    #[command(name = "collect-refs")]
    CollectRefs,

    /// Scan a collected digest,cbor CSV for Aiken-generated scripts
    #[command(name = "detect-aiken")]
    DetectAiken {
        /// Path to the CSV produced by `chaincensus collect`
        #[arg(long, default_value = "./data/scripts.csv")]
        scripts: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Count => cmd_count::run(RunConfig::from_env()?).await,
        Commands::Collect => cmd_collect::run(RunConfig::from_env()?).await,
        Commands::CollectRefs => cmd_collect_refs::run(RunConfig::from_env()?).await,
        Commands::DetectAiken { scripts } => cmd_detect_aiken::run(&scripts),
    }
}
