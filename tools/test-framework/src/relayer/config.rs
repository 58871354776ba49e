/*!
   A subset of the hermes configuration file, enough to relay between the
   chains bootstrapped by the test framework.
*/

use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{handle_generic_error, Error};
use crate::types::single::node::FullNode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub global: GlobalConfig,
    pub mode: ModeConfig,
    pub rest: ServiceConfig,
    pub telemetry: ServiceConfig,
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub clients: ClientsMode,
    pub connections: Toggle,
    pub channels: Toggle,
    pub packets: PacketsMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toggle {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientsMode {
    pub enabled: bool,
    pub refresh: bool,
    pub misbehaviour: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketsMode {
    pub enabled: bool,
    pub clear_interval: u64,
    pub clear_on_start: bool,
    pub tx_confirmation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub chain_type: String,
    pub rpc_addr: String,
    pub grpc_addr: String,
    pub rpc_timeout: String,
    pub account_prefix: String,
    pub key_name: String,
    pub key_store_type: String,
    pub key_store_folder: String,
    pub store_prefix: String,
    pub max_gas: u64,
    pub gas_multiplier: f64,
    pub clock_drift: String,
    pub max_block_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusting_period: Option<String>,
    pub event_source: EventSource,
    pub gas_price: GasPrice,
    pub trust_threshold: TrustThreshold,
    pub address_type: AddressType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSource {
    pub mode: String,
    pub url: String,
    pub batch_delay: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPrice {
    pub price: f64,
    pub denom: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustThreshold {
    pub numerator: String,
    pub denominator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressType {
    pub derivation: String,
}

/// Format a duration the way hermes parses durations, e.g. `"60s"`.
pub fn format_duration(duration: Duration) -> String {
    format!("{}s", duration.as_secs())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: GlobalConfig {
                log_level: "info".to_string(),
            },
            mode: ModeConfig {
                clients: ClientsMode {
                    enabled: true,
                    refresh: true,
                    misbehaviour: false,
                },
                connections: Toggle { enabled: false },
                channels: Toggle { enabled: false },
                packets: PacketsMode {
                    enabled: true,
                    clear_interval: 100,
                    clear_on_start: true,
                    tx_confirmation: false,
                },
            },
            rest: ServiceConfig {
                enabled: false,
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            telemetry: ServiceConfig {
                enabled: false,
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            chains: Vec::new(),
        }
    }
}

impl ChainConfig {
    /**
       Generate the relayer's chain config based on the configuration of
       the full node. The relayer signs with the node's relayer wallet.
    */
    pub fn for_node(node: &FullNode, key_store_folder: &Path) -> Self {
        let driver = &node.chain_driver;

        Self {
            id: driver.chain_id.to_string(),
            chain_type: "CosmosSdk".to_string(),
            rpc_addr: driver.rpc_address(),
            grpc_addr: driver.grpc_address(),
            rpc_timeout: "10s".to_string(),
            account_prefix: driver.account_prefix.clone(),
            key_name: node.wallets.relayer.id.0.clone(),
            key_store_type: "Test".to_string(),
            key_store_folder: key_store_folder.display().to_string(),
            store_prefix: "ibc".to_string(),
            max_gas: 3000000,
            gas_multiplier: 1.5,
            clock_drift: "5s".to_string(),
            max_block_time: "30s".to_string(),
            trusting_period: None,
            event_source: EventSource {
                mode: "push".to_string(),
                url: driver.websocket_address(),
                batch_delay: "500ms".to_string(),
            },
            gas_price: GasPrice {
                price: 0.003,
                denom: driver.denom.clone(),
            },
            trust_threshold: TrustThreshold {
                numerator: "2".to_string(),
                denominator: "3".to_string(),
            },
            address_type: AddressType {
                derivation: "cosmos".to_string(),
            },
        }
    }
}

impl Config {
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(handle_generic_error)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_config(id: &str) -> ChainConfig {
        ChainConfig {
            id: id.to_string(),
            chain_type: "CosmosSdk".to_string(),
            rpc_addr: "http://localhost:26657".to_string(),
            grpc_addr: "http://localhost:9090".to_string(),
            rpc_timeout: "10s".to_string(),
            account_prefix: "juno".to_string(),
            key_name: "relayer".to_string(),
            key_store_type: "Test".to_string(),
            key_store_folder: "/tmp/keys".to_string(),
            store_prefix: "ibc".to_string(),
            max_gas: 3000000,
            gas_multiplier: 1.5,
            clock_drift: "5s".to_string(),
            max_block_time: "30s".to_string(),
            trusting_period: Some(format_duration(Duration::from_secs(60))),
            event_source: EventSource {
                mode: "push".to_string(),
                url: "ws://localhost:26657/websocket".to_string(),
                batch_delay: "500ms".to_string(),
            },
            gas_price: GasPrice {
                price: 0.003,
                denom: "ujuno".to_string(),
            },
            trust_threshold: TrustThreshold {
                numerator: "2".to_string(),
                denominator: "3".to_string(),
            },
            address_type: AddressType {
                derivation: "cosmos".to_string(),
            },
        }
    }

    #[test]
    fn config_is_written_as_hermes_toml() {
        let mut config = Config::default();
        config.chains.push(chain_config("ibc-alpha-1"));
        config.chains.push(chain_config("ibc-beta-2"));

        let raw = config.to_toml().unwrap();

        assert!(raw.contains("[[chains]]"));
        assert!(raw.contains("type = \"CosmosSdk\""));
        assert!(raw.contains("trusting_period = \"60s\""));

        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(parsed, config);
    }
}
