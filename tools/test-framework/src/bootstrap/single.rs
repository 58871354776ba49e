/*!
    Helper functions for bootstrapping a single full node.
*/

use core::time::Duration;
use std::fs;
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::chain::builder::ChainBuilder;
use crate::chain::config;
use crate::chain::ext::bootstrap::ChainBootstrapMethodsExt;
use crate::error::Error;
use crate::types::single::node::FullNode;
use crate::types::wallet::{TestWallets, Wallet};
use crate::util::random::random_u32;

/// Amount of native tokens given to each genesis wallet.
const WALLET_BALANCE: u128 = 1_000_000_000_000;

/// Amount of native tokens staked by the validator.
const VALIDATOR_STAKE: u128 = 100_000_000_000;

/**
   Bootstrap a single full node with the provided [`ChainBuilder`] and
   a prefix for the chain ID.

   The function would generate random postfix attached to the end of
   a chain ID. So for example having a prefix `"alpha"` may generate
   a chain with an ID  like `"ibc-alpha-f5a2a988"`

   The validator, relayer and user wallets are created with random key
   names, and the ports of the node are picked at random, so that several
   nodes can run side by side.
*/
pub fn bootstrap_single_node(
    builder: &ChainBuilder,
    prefix: &str,
    chain_number: usize,
    config_modifier: impl FnOnce(&mut toml::Value) -> Result<(), Error>,
    genesis_modifier: impl FnOnce(&mut serde_json::Value) -> Result<(), Error>,
) -> Result<FullNode, Error> {
    let chain_driver = builder.new_chain(prefix, chain_number);

    fs::create_dir_all(&chain_driver.home_path)?;

    chain_driver.initialize()?;

    let denom = chain_driver.denom.clone();

    chain_driver.update_genesis_file("genesis.json", |genesis| {
        config::set_genesis_denom(genesis, &denom)?;
        genesis_modifier(genesis)
    })?;

    let validator = add_wallet(&chain_driver, "validator")?;
    let relayer = add_wallet(&chain_driver, "relayer")?;
    let user = add_wallet(&chain_driver, "user")?;

    let balance = vec![format!("{}{}", WALLET_BALANCE, denom)];

    chain_driver.add_genesis_account(&validator.address, &balance)?;
    chain_driver.add_genesis_account(&relayer.address, &balance)?;
    chain_driver.add_genesis_account(&user.address, &balance)?;

    chain_driver.add_genesis_validator(&validator.id, &format!("{}{}", VALIDATOR_STAKE, denom))?;

    chain_driver.collect_gen_txs()?;

    let log_level = std::env::var("CHAIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    chain_driver.update_chain_config("config.toml", |config| {
        config::set_log_level(config, &log_level)?;
        config::set_rpc_port(config, chain_driver.rpc_port)?;
        config::set_p2p_port(config, chain_driver.p2p_port)?;
        config::set_pprof_port(config, chain_driver.pprof_port)?;
        config::set_timeout_commit(config, Duration::from_secs(1))?;
        config::set_timeout_propose(config, Duration::from_secs(1))?;

        config_modifier(config)?;

        Ok(())
    })?;

    chain_driver.update_chain_config("app.toml", |config| {
        config::set_grpc_port(config, chain_driver.grpc_port)?;
        config::disable_grpc_web(config)?;
        config::disable_api(config)?;
        config::set_minimum_gas_price(config, &format!("0{}", denom))?;

        Ok(())
    })?;

    let process = chain_driver.start()?;

    chain_driver.assert_eventually_running()?;

    info!(
        "started new chain {} at with home path {} and RPC address {}.",
        chain_driver.chain_id,
        chain_driver.home_path,
        chain_driver.rpc_address(),
    );

    info!(
        "user wallet for chain {} - id: {}, address: {}",
        chain_driver.chain_id, user.id, user.address,
    );

    info!(
        "you can manually interact with the chain using commands starting with:\n{} --home '{}' --node {}",
        chain_driver.command_path,
        chain_driver.home_path,
        chain_driver.rpc_address(),
    );

    let wallets = TestWallets {
        validator,
        relayer,
        user,
    };

    let node = FullNode {
        chain_driver,
        wallets,
        process: Arc::new(RwLock::new(process)),
    };

    Ok(node)
}

fn add_wallet(
    driver: &impl ChainBootstrapMethodsExt,
    prefix: &str,
) -> Result<Wallet, Error> {
    let wallet_id = format!("{}-{:x}", prefix, random_u32());
    driver.add_wallet(&wallet_id)
}
