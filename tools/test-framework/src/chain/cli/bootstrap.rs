use tracing::debug;

use crate::chain::driver::ChainDriver;
use crate::chain::exec::ExecOutput;
use crate::error::Error;
use crate::types::process::ChildProcess;

pub fn initialize(driver: &ChainDriver) -> Result<(), Error> {
    driver.exec(&[
        "--home",
        &driver.home_path,
        "init",
        driver.chain_id.as_str(),
        "--chain-id",
        driver.chain_id.as_str(),
    ])?;

    Ok(())
}

/**
   Add a key to the test keyring, returning the JSON describing it,
   including its mnemonic.
*/
pub fn add_wallet(driver: &ChainDriver, wallet_id: &str) -> Result<String, Error> {
    let output = driver.exec(&[
        "--home",
        &driver.home_path,
        "keys",
        "add",
        wallet_id,
        "--keyring-backend",
        "test",
        "--output",
        "json",
    ])?;

    // Older SDK versions print the key to stderr.
    if output.stdout.trim().is_empty() {
        Ok(output.stderr)
    } else {
        Ok(output.stdout)
    }
}

pub fn add_genesis_account(
    driver: &ChainDriver,
    wallet_address: &str,
    amounts: &[String],
) -> Result<(), Error> {
    let amounts_str = itertools::join(amounts, ",");

    exec_genesis_command(
        driver,
        &[
            "add-genesis-account",
            wallet_address,
            &amounts_str,
            "--keyring-backend",
            "test",
        ],
    )?;

    Ok(())
}

pub fn add_genesis_validator(
    driver: &ChainDriver,
    wallet_id: &str,
    amount: &str,
) -> Result<(), Error> {
    exec_genesis_command(
        driver,
        &[
            "gentx",
            wallet_id,
            amount,
            "--keyring-backend",
            "test",
            "--chain-id",
            driver.chain_id.as_str(),
        ],
    )?;

    Ok(())
}

pub fn collect_gen_txs(driver: &ChainDriver) -> Result<(), Error> {
    exec_genesis_command(driver, &["collect-gentxs"])?;

    Ok(())
}

/**
   Run a genesis subcommand, which newer SDK versions group under
   `genesis` and older ones keep at the top level.
*/
fn exec_genesis_command(driver: &ChainDriver, args: &[&str]) -> Result<ExecOutput, Error> {
    let mut grouped = vec!["--home", &driver.home_path, "genesis"];
    grouped.extend_from_slice(args);

    match driver.exec(&grouped) {
        Ok(output) => Ok(output),
        Err(e) => {
            debug!(
                "genesis subcommand failed, retrying with legacy command: {}",
                e
            );

            let mut legacy = vec!["--home", &driver.home_path];
            legacy.extend_from_slice(args);

            driver.exec(&legacy)
        }
    }
}

pub fn start_chain(driver: &ChainDriver) -> Result<ChildProcess, Error> {
    let rpc_laddr = format!("tcp://0.0.0.0:{}", driver.rpc_port);
    let grpc_address = format!("0.0.0.0:{}", driver.grpc_port);

    driver.runner.spawn(
        driver.chain_id.as_str(),
        &driver.command_path,
        &driver.home_path,
        &driver.container_name(),
        &[
            "--home",
            &driver.home_path,
            "start",
            "--pruning",
            "nothing",
            "--rpc.laddr",
            &rpc_laddr,
            "--grpc.address",
            &grpc_address,
        ],
    )
}
