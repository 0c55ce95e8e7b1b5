//! RPC server implementation.
//!
//! HTTP server using jsonrpsee.

use crate::api::{DaoApiServer, DaoRpc};
use crate::error::RpcError;
use jsonrpsee::server::{ServerBuilder, ServerHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use votedao_governance::VotingEngine;

/// RPC server configuration.
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    /// HTTP server address
    pub http_addr: SocketAddr,
    /// Max request body size
    pub max_body_size: u32,
    /// Max connections
    pub max_connections: u32,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8545)),
            max_body_size: 1024 * 1024, // 1 MB
            max_connections: 100,
        }
    }
}

/// RPC server.
pub struct RpcServer {
    config: RpcServerConfig,
    engine: Arc<VotingEngine>,
    handle: Option<ServerHandle>,
    local_addr: Option<SocketAddr>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, engine: Arc<VotingEngine>) -> Self {
        Self {
            config,
            engine,
            handle: None,
            local_addr: None,
        }
    }

    /// Bind and start serving `dao_` methods.
    pub async fn start(&mut self) -> Result<(), RpcError> {
        if self.handle.is_some() {
            return Err(RpcError::InvalidOperation("RPC server already running".to_string()));
        }

        let server = ServerBuilder::new()
            .max_request_body_size(self.config.max_body_size)
            .max_connections(self.config.max_connections)
            .build(self.config.http_addr)
            .await
            .map_err(|e| RpcError::InternalError(format!("Failed to build HTTP server: {}", e)))?;

        let local_addr = server
            .local_addr()
            .map_err(|e| RpcError::InternalError(format!("Failed to read bound address: {}", e)))?;

        let module = DaoRpc::new(self.engine.clone()).into_rpc();
        self.handle = Some(server.start(module));
        self.local_addr = Some(local_addr);

        tracing::info!("HTTP RPC server started on {}", local_addr);
        Ok(())
    }

    /// Stop the RPC server and wait for it to shut down.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.stop() {
                tracing::warn!("HTTP server stop failed: {}", e);
            }
            handle.stopped().await;
        }
        self.local_addr = None;
        tracing::info!("RPC server stopped");
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Address the server is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}
