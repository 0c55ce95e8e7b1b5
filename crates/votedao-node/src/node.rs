//! Node lifecycle: engine bootstrap, RPC and metrics servers, state persistence.

use crate::config::NodeConfig;
use crate::metrics::{Metrics, MetricsServer};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use votedao_governance::{EngineSnapshot, StaticBalances, SystemClock, VotingEngine};
use votedao_rpc::{RpcServer, RpcServerConfig};

/// Node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Initializing,
    Running,
    ShuttingDown,
    Stopped,
}

/// A VoteDAO node.
pub struct VoteDaoNode {
    /// Node configuration
    pub config: NodeConfig,
    /// Current state
    pub state: NodeState,
    /// The voting engine
    pub engine: Arc<VotingEngine>,
    /// Balances served to the engine
    pub balances: Arc<StaticBalances>,
    metrics: Option<Arc<Metrics>>,
    rpc_server: Option<RpcServer>,
    metrics_task: Option<JoinHandle<()>>,
    shutdown: mpsc::Receiver<()>,
}

impl VoteDaoNode {
    /// Build the node; restores the engine from `state_file` when it exists.
    pub fn new(config: NodeConfig) -> anyhow::Result<(Self, mpsc::Sender<()>)> {
        info!("Initializing VoteDAO node: {}", config.name);

        let balances = Arc::new(StaticBalances::with_balances(
            config.governance.initial_balances()?,
        ));
        info!("Loaded {} balances", balances.len());

        let metrics = if config.metrics.enabled {
            Some(Metrics::new()?)
        } else {
            None
        };

        let mut engine = match load_snapshot(config.governance.state_file.as_deref())? {
            Some(snapshot) => {
                info!(
                    "Restoring state: {} votes, {} admins",
                    snapshot.vote_count,
                    snapshot.admins.len()
                );
                VotingEngine::restore(snapshot, balances.clone(), Arc::new(SystemClock))?
            }
            None => VotingEngine::new(
                config.governance.deployer,
                balances.clone(),
                Arc::new(SystemClock),
            )
            .with_admins(config.governance.admins.iter().copied()),
        };

        if let Some(metrics) = &metrics {
            metrics.vote_count.set(engine.vote_count() as i64);
            engine = engine.with_observer(metrics.clone());
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let node = Self {
            config,
            state: NodeState::Initializing,
            engine: Arc::new(engine),
            balances,
            metrics,
            rpc_server: None,
            metrics_task: None,
            shutdown: shutdown_rx,
        };
        Ok((node, shutdown_tx))
    }

    /// Start the RPC server and, if enabled, the metrics server.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let rpc_config = RpcServerConfig {
            http_addr: self.config.rpc.http_addr,
            max_body_size: self.config.rpc.max_body_size,
            max_connections: self.config.rpc.max_connections,
        };
        let mut rpc_server = RpcServer::new(rpc_config, self.engine.clone());
        rpc_server.start().await?;
        self.rpc_server = Some(rpc_server);

        if let Some(metrics) = &self.metrics {
            let server = MetricsServer::new(self.config.metrics.addr, metrics.clone());
            self.metrics_task = Some(tokio::spawn(async move {
                if let Err(e) = server.start().await {
                    error!("Metrics server error: {}", e);
                }
            }));
        }

        self.state = NodeState::Running;
        info!("VoteDAO node started");
        Ok(())
    }

    /// Address the RPC server is bound to.
    pub fn rpc_addr(&self) -> Option<std::net::SocketAddr> {
        self.rpc_server.as_ref().and_then(|s| s.local_addr())
    }

    /// Run until a shutdown signal or Ctrl+C, then shut down.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!("Node is running. Press Ctrl+C to shutdown.");

        tokio::select! {
            _ = self.shutdown.recv() => {
                info!("Shutdown signal received");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received");
            }
        }

        self.shutdown().await
    }

    /// Graceful shutdown: stop serving, then persist state.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.state = NodeState::ShuttingDown;
        info!("Shutting down VoteDAO node...");

        if let Some(mut rpc_server) = self.rpc_server.take() {
            rpc_server.stop().await;
        }
        if let Some(task) = self.metrics_task.take() {
            task.abort();
        }

        if let Some(path) = &self.config.governance.state_file {
            save_snapshot(path, &self.engine.snapshot())?;
            info!("State saved to {}", path.display());
        }

        self.state = NodeState::Stopped;
        info!("VoteDAO node stopped");
        Ok(())
    }
}

fn load_snapshot(path: Option<&Path>) -> anyhow::Result<Option<EngineSnapshot>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        warn!("State file {} not found, starting fresh", path.display());
        return Ok(None);
    }
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read state file '{}': {}", path.display(), e))?;
    Ok(Some(EngineSnapshot::from_bytes(&bytes)?))
}

fn save_snapshot(path: &Path, snapshot: &EngineSnapshot) -> anyhow::Result<()> {
    let bytes = snapshot.to_bytes()?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write state file '{}': {}", tmp.display(), e))?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
