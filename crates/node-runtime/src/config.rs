//! Node configuration: regime, network, storage, and regime-specific
//! knobs, loaded from an optional TOML file with environment overrides.

use std::path::PathBuf;

use serde::Deserialize;
use shared_types::regime::Regime;

/// Complete node configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Consensus regime this node runs under.
    pub regime: Regime,
    /// Display name advertised to peers, de-duplicated by each peer's
    /// own directory.
    pub node_name: String,
    /// Host to listen for peer connections on.
    pub host: String,
    /// Port to listen for peer connections on.
    pub port: u16,
    /// Port the status/control HTTP API binds to.
    pub rpc_port: u16,
    /// Directory snapshots are persisted under.
    pub data_dir: PathBuf,
    /// `host:port` addresses to dial on startup.
    pub bootstrap_peers: Vec<String>,
    /// Maximum outbound connections this node keeps open at once.
    pub max_connections: usize,
    /// PoA only: the initial roster, used only when bootstrapping a
    /// fresh network (Genesis has not been created yet).
    pub initial_miners: Vec<String>,
    /// PoS/PoW only: the amount genesis allocates to this node when it
    /// is the first node of a fresh network.
    pub genesis_amount: f64,
    /// PoS only: the amount this node stakes as its own, Genesis-time
    /// deposit when first bootstrapping a network.
    pub genesis_stake: f64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            regime: Regime::PoW,
            node_name: "node".to_string(),
            host: "0.0.0.0".to_string(),
            port: 9000,
            rpc_port: 8080,
            data_dir: PathBuf::from("./data"),
            bootstrap_peers: Vec::new(),
            max_connections: 8,
            initial_miners: Vec::new(),
            genesis_amount: shared_types::entities::GENESIS_AMOUNT,
            genesis_stake: 10.0,
        }
    }
}

impl NodeConfig {
    /// Load from `path` if it exists, falling back to defaults, then
    /// apply environment overrides (`QC_REGIME`, `QC_HOST`, `QC_PORT`,
    /// `QC_RPC_PORT`, `QC_DATA_DIR`, `QC_BOOTSTRAP_PEERS` comma-separated,
    /// `QC_MAX_CONNECTIONS`, `QC_NODE_NAME`).
    pub fn load(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path)?;
                toml::from_str(&text)?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        use std::env;

        if let Ok(v) = env::var("QC_REGIME") {
            self.regime = match v.to_lowercase().as_str() {
                "pow" => Regime::PoW,
                "pos" => Regime::PoS,
                "poa" => Regime::PoA,
                _ => self.regime,
            };
        }
        if let Ok(v) = env::var("QC_NODE_NAME") {
            self.node_name = v;
        }
        if let Ok(v) = env::var("QC_HOST") {
            self.host = v;
        }
        if let Ok(v) = env::var("QC_PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = env::var("QC_RPC_PORT") {
            if let Ok(port) = v.parse() {
                self.rpc_port = port;
            }
        }
        if let Ok(v) = env::var("QC_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("QC_BOOTSTRAP_PEERS") {
            self.bootstrap_peers = v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect();
        }
        if let Ok(v) = env::var("QC_MAX_CONNECTIONS") {
            if let Ok(n) = v.parse() {
                self.max_connections = n;
            }
        }
    }

    /// The address this node listens on.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_pow_and_standard_ports() {
        let config = NodeConfig::default();
        assert_eq!(config.regime, Regime::PoW);
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn load_falls_back_to_defaults_when_file_is_absent() {
        let config = NodeConfig::load(Some(std::path::Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.regime, Regime::PoW);
    }

    #[test]
    fn load_parses_a_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "regime = \"poa\"\nport = 9100\n").unwrap();
        let config = NodeConfig::load(Some(&path)).unwrap();
        assert_eq!(config.regime, Regime::PoA);
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn env_override_wins_over_file() {
        std::env::set_var("QC_PORT", "9999");
        let config = NodeConfig::load(None).unwrap();
        assert_eq!(config.port, 9999);
        std::env::remove_var("QC_PORT");
    }
}
