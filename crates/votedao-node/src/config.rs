//! Node configuration.
//!
//! Handles loading and validation of node configuration from
//! config files and command-line arguments.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use votedao_types::{Address, Weight};

/// Node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node name
    pub name: String,
    /// RPC configuration
    pub rpc: RpcConfig,
    /// Voting engine configuration
    pub governance: GovernanceConfig,
    /// Metrics configuration
    pub metrics: MetricsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "votedao-node".to_string(),
            rpc: RpcConfig::default(),
            governance: GovernanceConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: NodeConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.governance.deployer.is_zero() {
            anyhow::bail!("governance.deployer must be set to a non-zero address");
        }

        if self.rpc.max_body_size == 0 {
            anyhow::bail!("rpc.max_body_size cannot be 0");
        }
        if self.rpc.max_connections == 0 {
            anyhow::bail!("rpc.max_connections cannot be 0");
        }

        if self.metrics.enabled && self.metrics.addr == self.rpc.http_addr && self.rpc.http_addr.port() != 0 {
            anyhow::bail!("metrics and RPC cannot share address {}", self.rpc.http_addr);
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => anyhow::bail!("Unknown log format '{}' (expected pretty or json)", other),
        }

        self.governance.initial_balances()?;
        Ok(())
    }
}

/// RPC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// HTTP RPC address
    pub http_addr: SocketAddr,
    /// Maximum request body size (bytes)
    pub max_body_size: u32,
    /// Maximum concurrent connections
    pub max_connections: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8545)),
            max_body_size: 1024 * 1024,
            max_connections: 100,
        }
    }
}

/// One balance allocation served by the node's balance oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub address: Address,
    /// Decimal token amount, e.g. "12.5"
    pub amount: String,
}

/// Voting engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Initial admin on a fresh start
    pub deployer: Address,
    /// Extra admins on a fresh start
    pub admins: Vec<Address>,
    /// Token balances
    pub balances: Vec<BalanceEntry>,
    /// Snapshot file, loaded on start and written on shutdown
    pub state_file: Option<PathBuf>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            deployer: Address::ZERO,
            admins: Vec::new(),
            balances: Vec::new(),
            state_file: None,
        }
    }
}

impl GovernanceConfig {
    /// Parse the configured balances.
    pub fn initial_balances(&self) -> anyhow::Result<Vec<(Address, Weight)>> {
        let mut seen = HashSet::with_capacity(self.balances.len());
        self.balances
            .iter()
            .map(|entry| -> anyhow::Result<(Address, Weight)> {
                if !seen.insert(entry.address) {
                    anyhow::bail!("Duplicate balance entry for {}", entry.address);
                }
                let amount = Weight::from_decimal_str(&entry.amount).map_err(|e| {
                    anyhow::anyhow!("Invalid balance for {}: {}", entry.address, e)
                })?;
                Ok((entry.address, amount))
            })
            .collect()
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable metrics
    pub enabled: bool,
    /// Metrics server address
    pub addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: SocketAddr::from(([127, 0, 0, 1], 9090)),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive
    pub level: String,
    /// Log to file
    pub log_file: Option<PathBuf>,
    /// Log format (json|pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn deployer() -> Address {
        Address::from_bytes([7u8; 20])
    }

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.name, "votedao-node");
        assert!(!config.metrics.enabled);
        assert_eq!(config.rpc.http_addr.port(), 8545);
    }

    #[test]
    fn test_config_validation() {
        let mut config = NodeConfig::default();
        // No deployer yet
        assert!(config.validate().is_err());

        config.governance.deployer = deployer();
        assert!(config.validate().is_ok());

        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
        config.logging.format = "json".to_string();

        config.governance.balances.push(BalanceEntry {
            address: deployer(),
            amount: "1.2.3".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_balances() {
        let mut config = GovernanceConfig::default();
        config.balances.push(BalanceEntry {
            address: deployer(),
            amount: "2.5".to_string(),
        });
        let parsed = config.initial_balances().unwrap();
        assert_eq!(parsed, vec![(deployer(), Weight::from_raw(2_500_000_000_000_000_000))]);
    }

    #[test]
    fn test_duplicate_balance_entries_rejected() {
        let mut config = NodeConfig::default();
        config.governance.deployer = deployer();
        for amount in ["1", "2"] {
            config.governance.balances.push(BalanceEntry {
                address: deployer(),
                amount: amount.to_string(),
            });
        }

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate balance entry"));
        assert!(config.governance.initial_balances().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
name = "council"

[governance]
deployer = "0x0707070707070707070707070707070707070707"
admins = ["0x0808080808080808080808080808080808080808"]

[[governance.balances]]
address = "0x0707070707070707070707070707070707070707"
amount = "100"
"#
        )
        .unwrap();

        let config = NodeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.name, "council");
        assert_eq!(config.governance.deployer, deployer());
        assert_eq!(config.governance.admins.len(), 1);
        assert_eq!(config.rpc.max_connections, 100);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");

        let mut config = NodeConfig::default();
        config.governance.deployer = deployer();
        config.governance.state_file = Some(dir.path().join("state.bin"));
        config.to_file(&path).unwrap();

        let loaded = NodeConfig::from_file(&path).unwrap();
        assert_eq!(loaded.governance.deployer, deployer());
        assert_eq!(loaded.governance.state_file, config.governance.state_file);
    }

    #[test]
    fn test_missing_file() {
        let err = NodeConfig::from_file(Path::new("/nonexistent/votedao.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
