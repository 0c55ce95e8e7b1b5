//! Metrics collection and reporting.
//!
//! Uses Prometheus for metrics collection and exposition.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;
use votedao_governance::{EngineObserver, ErrorKind, Operation};

/// Metrics collector.
pub struct Metrics {
    /// Prometheus registry
    registry: Registry,
    /// Committed mutations by operation
    pub operations_committed: IntCounterVec,
    /// Rejected mutations by operation and error kind
    pub operations_rejected: IntCounterVec,
    /// Votes created so far
    pub vote_count: IntGauge,
}

impl Metrics {
    /// Create new metrics collector.
    pub fn new() -> anyhow::Result<Arc<Self>> {
        let registry = Registry::new();

        let operations_committed = IntCounterVec::new(
            Opts::new(
                "votedao_operations_committed_total",
                "Total number of committed engine mutations",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(operations_committed.clone()))?;

        let operations_rejected = IntCounterVec::new(
            Opts::new(
                "votedao_operations_rejected_total",
                "Total number of rejected engine mutations",
            ),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(operations_rejected.clone()))?;

        let vote_count = IntGauge::new("votedao_vote_count", "Number of votes created")?;
        registry.register(Box::new(vote_count.clone()))?;

        Ok(Arc::new(Self {
            registry,
            operations_committed,
            operations_rejected,
            vote_count,
        }))
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl EngineObserver for Metrics {
    fn committed(&self, op: Operation) {
        self.operations_committed.with_label_values(&[op.as_str()]).inc();
        if op == Operation::CreateVote {
            self.vote_count.inc();
        }
    }

    fn rejected(&self, op: Operation, kind: ErrorKind) {
        self.operations_rejected
            .with_label_values(&[op.as_str(), kind.as_str()])
            .inc();
    }
}

/// Metrics server.
pub struct MetricsServer {
    addr: std::net::SocketAddr,
    metrics: Arc<Metrics>,
}

impl MetricsServer {
    /// Create new metrics server.
    pub fn new(addr: std::net::SocketAddr, metrics: Arc<Metrics>) -> Self {
        Self { addr, metrics }
    }

    /// Serve `/metrics` until the task is dropped.
    pub async fn start(&self) -> anyhow::Result<()> {
        let metrics = self.metrics.clone();

        let app = axum::Router::new().route(
            "/metrics",
            axum::routing::get(move || {
                let metrics = metrics.clone();
                async move {
                    match metrics.export() {
                        Ok(output) => (axum::http::StatusCode::OK, output),
                        Err(e) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("Metrics server listening on {}", self.addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
