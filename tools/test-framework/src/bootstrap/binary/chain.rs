/*!
    Helper functions for bootstrapping the relayer between two running
    full nodes, with a light client on each chain and a connection.
*/

use core::time::Duration;
use tracing::info;

use crate::error::Error;
use crate::relayer::config::{format_duration, ChainConfig, Config};
use crate::relayer::driver::RelayerDriver;
use crate::types::binary::chains::ConnectedChains;
use crate::types::config::TestConfig;
use crate::types::single::node::FullNode;

/**
   Options for creating the light clients of the two chains.
*/
#[derive(Debug, Clone, Default)]
pub struct BootstrapClientOptions {
    /**
       The trusting period of both clients. When `None`, the relayer
       derives it from the unbonding period.
    */
    pub trusting_period: Option<Duration>,
}

impl BootstrapClientOptions {
    pub fn trusting_period(mut self, trusting_period: Duration) -> Self {
        self.trusting_period = Some(trusting_period);
        self
    }
}

/**
   Bootstraps the relayer between two running full nodes.

   Takes two [`FullNode`] values representing two different running
   full nodes. The relayer config is generated from them and passed to
   `config_modifier` before being saved, the relayer wallets of both
   nodes are imported, and a client is created on each chain followed
   by a connection between the two clients.
*/
pub fn bootstrap_chain_pair_with_nodes(
    test_config: &TestConfig,
    node_a: FullNode,
    node_b: FullNode,
    client_options: BootstrapClientOptions,
    config_modifier: impl FnOnce(&mut Config),
) -> Result<(RelayerDriver, ConnectedChains), Error> {
    let relayer_home = test_config.chain_store_dir.join("relayer");
    let key_store_folder = relayer_home.join("keys");

    let mut config = Config::default();

    for node in [&node_a, &node_b] {
        let mut chain_config = ChainConfig::for_node(node, &key_store_folder);
        chain_config.trusting_period = client_options.trusting_period.map(format_duration);
        config.chains.push(chain_config);
    }

    config_modifier(&mut config);

    let relayer = RelayerDriver::new(
        &test_config.relayer_command_path,
        relayer_home,
        config,
        test_config.hang_on_fail,
    )?;

    for node in [&node_a, &node_b] {
        relayer.add_key(
            &node.chain_driver.chain_id,
            &node.wallets.relayer.id.0,
            &node.wallets.relayer.mnemonic,
        )?;
    }

    let chain_id_a = node_a.chain_driver.chain_id.clone();
    let chain_id_b = node_b.chain_driver.chain_id.clone();

    let client_id_a =
        relayer.create_client(&chain_id_a, &chain_id_b, client_options.trusting_period)?;
    let client_id_b =
        relayer.create_client(&chain_id_b, &chain_id_a, client_options.trusting_period)?;

    let (connection_id_a, connection_id_b) =
        relayer.create_connection(&chain_id_a, &client_id_a, &client_id_b)?;

    info!(
        "bootstrapped connection {} on chain {} and {} on chain {}",
        connection_id_a, chain_id_a, connection_id_b, chain_id_b
    );

    let chains = ConnectedChains {
        node_a,
        node_b,
        client_id_a,
        client_id_b,
        connection_id_a,
        connection_id_b,
    };

    Ok((relayer, chains))
}

/**
   Refresh the clients on both chains of a [`ConnectedChains`].
*/
pub fn update_clients(relayer: &RelayerDriver, chains: &ConnectedChains) -> Result<(), Error> {
    relayer.update_client(chains.chain_id_a(), &chains.client_id_a)?;
    relayer.update_client(chains.chain_id_b(), &chains.client_id_b)?;

    Ok(())
}
