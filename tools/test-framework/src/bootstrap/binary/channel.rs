/*!
   Helper functions for deploying the counter contracts on two connected
   chains and opening a channel between them.
*/

use ibc_relayer_types::core::ics04_channel::channel::Ordering;
use ibc_relayer_types::core::ics04_channel::version::Version;
use tracing::info;

use cw_ibc_example::msg::InstantiateMsg;

use crate::chain::ext::wasm::ChainWasmMethodsExt;
use crate::error::Error;
use crate::relayer::driver::RelayerDriver;
use crate::types::binary::chains::ConnectedChains;
use crate::types::binary::channel::ConnectedChannel;
use crate::types::config::TestConfig;
use crate::types::single::node::FullNode;

/// The channel version accepted by the counter contract.
pub const COUNTER_VERSION: &str = "counter-1";

/// Label of the deployed counter contracts.
pub const CONTRACT_LABEL: &str = "cw-ibc-example";

/**
   Optional parameters for [`bootstrap_channel_with_chains`].
*/
#[derive(Debug, Clone)]
pub struct BootstrapChannelOptions {
    pub order: Ordering,
    pub version: Version,
}

impl Default for BootstrapChannelOptions {
    fn default() -> Self {
        Self {
            order: Ordering::Unordered,
            version: Version::new(COUNTER_VERSION.to_string()),
        }
    }
}

impl BootstrapChannelOptions {
    pub fn order(mut self, order: Ordering) -> Self {
        self.order = order;
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}

/**
   Store and instantiate the counter contract on a node with its user
   wallet, returning the contract address.
*/
pub fn deploy_counter_contract(test_config: &TestConfig, node: &FullNode) -> Result<String, Error> {
    let driver = &node.chain_driver;
    let user = &node.wallets.user;

    let code_id = driver.store_contract(user, &test_config.contract_wasm_path)?;

    driver.instantiate_contract(user, code_id, &InstantiateMsg {}, CONTRACT_LABEL)
}

/**
   Deploy a counter contract on each chain and open a channel between
   their ports over the existing connection.
*/
pub fn bootstrap_channel_with_chains(
    test_config: &TestConfig,
    relayer: &RelayerDriver,
    chains: &ConnectedChains,
    options: BootstrapChannelOptions,
) -> Result<ConnectedChannel, Error> {
    let contract_a = deploy_counter_contract(test_config, &chains.node_a)?;
    let contract_b = deploy_counter_contract(test_config, &chains.node_b)?;

    let port_a = chains.node_a.chain_driver.query_contract_port(&contract_a)?;
    let port_b = chains.node_b.chain_driver.query_contract_port(&contract_b)?;

    let (channel_id_a, channel_id_b) = relayer.create_channel(
        chains.chain_id_a(),
        &chains.connection_id_a,
        &port_a,
        &port_b,
        options.order,
        &options.version,
    )?;

    info!(
        "opened channel {} on chain {} and {} on chain {} between the counter contracts",
        channel_id_a,
        chains.chain_id_a(),
        channel_id_b,
        chains.chain_id_b()
    );

    Ok(ConnectedChannel {
        contract_a,
        contract_b,
        port_a,
        port_b,
        channel_id_a,
        channel_id_b,
    })
}
