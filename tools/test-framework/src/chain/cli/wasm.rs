use eyre::eyre;
use serde_json as json;

use crate::chain::cli::query::{find_event_attribute, parse_tx_hash, query_tx};
use crate::chain::driver::ChainDriver;
use crate::error::{handle_generic_error, Error};
use crate::types::contract::ContractStateResp;

/**
   Broadcast a `tx wasm` subcommand signed by `from` and wait for it to
   be committed, returning the committed transaction.
*/
fn exec_wasm_tx(driver: &ChainDriver, from: &str, args: &[&str]) -> Result<json::Value, Error> {
    let rpc_address = driver.rpc_listen_address();

    let mut full_args = vec![
        "--home",
        &driver.home_path,
        "--chain-id",
        driver.chain_id.as_str(),
        "--node",
        &rpc_address,
        "--keyring-backend",
        "test",
        "tx",
        "wasm",
    ];

    full_args.extend_from_slice(args);

    full_args.extend_from_slice(&[
        "--from",
        from,
        "--gas",
        "auto",
        "--gas-adjustment",
        "1.5",
        "--yes",
        "--output",
        "json",
    ]);

    let output = driver.exec(&full_args)?;

    let tx_hash = parse_tx_hash(&output.stdout)?;

    query_tx(driver, &tx_hash)
}

pub fn store_contract(driver: &ChainDriver, from: &str, wasm_file: &str) -> Result<u64, Error> {
    let tx = exec_wasm_tx(driver, from, &["store", wasm_file])?;

    let code_id = find_event_attribute(&tx, "store_code", "code_id")
        .ok_or_else(|| eyre!("expected store_code event with code_id in {}", tx))?;

    code_id.parse().map_err(handle_generic_error)
}

pub fn instantiate_contract(
    driver: &ChainDriver,
    from: &str,
    code_id: u64,
    init_msg: &str,
    label: &str,
    admin: Option<&str>,
) -> Result<String, Error> {
    let code_id = code_id.to_string();

    let mut args = vec!["instantiate", &code_id, init_msg, "--label", label];

    match admin {
        Some(admin) => args.extend_from_slice(&["--admin", admin]),
        None => args.push("--no-admin"),
    }

    let tx = exec_wasm_tx(driver, from, &args)?;

    let address = find_event_attribute(&tx, "instantiate", "_contract_address")
        .ok_or_else(|| eyre!("expected instantiate event with contract address in {}", tx))?;

    Ok(address)
}

pub fn execute_contract(
    driver: &ChainDriver,
    from: &str,
    contract: &str,
    msg: &str,
) -> Result<json::Value, Error> {
    exec_wasm_tx(driver, from, &["execute", contract, msg])
}

/**
   Run a smart query, returning the `{"data": ...}` envelope printed by
   the CLI.
*/
pub fn query_contract_smart(
    driver: &ChainDriver,
    contract: &str,
    query: &str,
) -> Result<json::Value, Error> {
    let output = driver.exec(&[
        "query",
        "wasm",
        "contract-state",
        "smart",
        contract,
        query,
        "--node",
        &driver.rpc_listen_address(),
        "--output",
        "json",
    ])?;

    json::from_str(&output.stdout).map_err(handle_generic_error)
}

pub fn query_contract_state_all(
    driver: &ChainDriver,
    contract: &str,
) -> Result<ContractStateResp, Error> {
    let output = driver.exec(&[
        "query",
        "wasm",
        "contract-state",
        "all",
        contract,
        "--node",
        &driver.rpc_listen_address(),
        "--output",
        "json",
    ])?;

    json::from_str(&output.stdout).map_err(handle_generic_error)
}

/**
   Query the contract info, which includes the IBC port bound by the
   contract in `contract_info.ibc_port_id`.
*/
pub fn query_contract_info(driver: &ChainDriver, contract: &str) -> Result<json::Value, Error> {
    let output = driver.exec(&[
        "query",
        "wasm",
        "contract",
        contract,
        "--node",
        &driver.rpc_listen_address(),
        "--output",
        "json",
    ])?;

    json::from_str(&output.stdout).map_err(handle_generic_error)
}
