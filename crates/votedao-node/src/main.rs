//! VoteDAO Node - serves the voting engine over JSON-RPC.

pub mod config;
pub mod metrics;
pub mod node;
pub mod telemetry;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use votedao_types::Address;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "votedao-node")]
#[command(about = "VoteDAO Node - token-weighted multi-candidate voting")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Config file path
    #[arg(short, long, value_name = "FILE", env = "VOTEDAO_CONFIG")]
    config: Option<PathBuf>,

    /// RPC HTTP listen address
    #[arg(long)]
    rpc_addr: Option<SocketAddr>,

    /// Log level or filter directive
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Enable metrics
    #[arg(long)]
    metrics: bool,

    /// Snapshot file to restore from and save to
    #[arg(long, value_name = "FILE")]
    state_file: Option<PathBuf>,

    /// Initial admin address on a fresh start
    #[arg(long, env = "VOTEDAO_DEPLOYER")]
    deployer: Option<Address>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut config::NodeConfig) {
        if let Some(addr) = self.rpc_addr {
            config.rpc.http_addr = addr;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.format = "json".to_string();
        }
        if self.metrics {
            config.metrics.enabled = true;
        }
        if let Some(path) = &self.state_file {
            config.governance.state_file = Some(path.clone());
        }
        if let Some(deployer) = self.deployer {
            config.governance.deployer = deployer;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", toml::to_string_pretty(&config::NodeConfig::default())?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => config::NodeConfig::from_file(path)?,
        None => config::NodeConfig::default(),
    };
    args.apply(&mut config);

    telemetry::init_telemetry(&config.logging)?;
    match &args.config {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("Using default configuration"),
    }

    config.validate()?;

    info!("Configuration:");
    info!("  Name: {}", config.name);
    info!("  RPC address: {}", config.rpc.http_addr);
    info!("  Deployer: {}", config.governance.deployer);
    info!("  State file: {:?}", config.governance.state_file);
    info!("  Metrics: {}", config.metrics.enabled);

    let (mut node, _shutdown) = node::VoteDaoNode::new(config)?;

    if let Err(e) = node.start().await {
        error!("Failed to start node: {}", e);
        return Err(e);
    }

    if let Err(e) = node.run().await {
        error!("Node error: {}", e);
        return Err(e);
    }

    info!("VoteDAO node shutdown complete");
    Ok(())
}
