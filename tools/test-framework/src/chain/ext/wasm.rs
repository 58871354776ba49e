use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json as json;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use cw_ibc_example::msg::ExecuteMsg;
use eyre::eyre;
use ibc_relayer_types::core::ics24_host::identifier::PortId;
use tracing::{debug, info};

use crate::chain::cli::wasm::{
    execute_contract, instantiate_contract, query_contract_info, query_contract_smart,
    query_contract_state_all, store_contract,
};
use crate::chain::driver::ChainDriver;
use crate::error::{handle_generic_error, Error};
use crate::types::contract::{ContractStateResp, QueryMsg, QueryResponse};
use crate::types::wallet::Wallet;

/**
   Methods for deploying and calling CosmWasm contracts through the chain
   command line.
*/
pub trait ChainWasmMethodsExt {
    /**
       Upload the wasm file at `wasm_path`, signed by `wallet`, and return
       the assigned code ID.

       The file is first copied into the chain home directory, so that it
       is reachable when the CLI runs inside a container.
    */
    fn store_contract(&self, wallet: &Wallet, wasm_path: &Path) -> Result<u64, Error>;

    /**
       Instantiate a contract with `wallet` as sender and admin, and return
       its address.
    */
    fn instantiate_contract(
        &self,
        wallet: &Wallet,
        code_id: u64,
        init_msg: &impl Serialize,
        label: &str,
    ) -> Result<String, Error>;

    fn execute_contract(
        &self,
        wallet: &Wallet,
        contract: &str,
        msg: &impl Serialize,
    ) -> Result<json::Value, Error>;

    /**
       Ask the counter contract at `contract` to send an increment packet
       over `channel`.
    */
    fn execute_increment(
        &self,
        wallet: &Wallet,
        contract: &str,
        channel: &str,
    ) -> Result<json::Value, Error>;

    fn query_contract<T: DeserializeOwned>(
        &self,
        contract: &str,
        msg: &impl Serialize,
    ) -> Result<T, Error>;

    /// Number of increments received on the local `channel`.
    fn query_count(&self, contract: &str, channel: &str) -> Result<u32, Error>;

    /// Number of increments sent on the local `channel` that timed out.
    fn query_timeout_count(&self, contract: &str, channel: &str) -> Result<u32, Error>;

    /**
       Dump all raw storage entries of a contract. Mostly useful for
       logging while debugging a test.
    */
    fn dump_contract_state(&self, contract: &str) -> Result<ContractStateResp, Error>;

    /// The IBC port bound by the contract, `wasm.<address>`.
    fn query_contract_port(&self, contract: &str) -> Result<PortId, Error>;
}

impl ChainWasmMethodsExt for ChainDriver {
    fn store_contract(&self, wallet: &Wallet, wasm_path: &Path) -> Result<u64, Error> {
        let file_name = wasm_path
            .file_name()
            .ok_or_else(|| eyre!("expected wasm path to be a file: {}", wasm_path.display()))?;

        let target = Path::new(&self.home_path).join(file_name);
        fs::copy(wasm_path, &target)?;

        let code_id = store_contract(self, &wallet.id.0, &target.display().to_string())?;

        info!(
            "stored contract {} on chain {} with code id {}",
            wasm_path.display(),
            self.chain_id,
            code_id
        );

        Ok(code_id)
    }

    fn instantiate_contract(
        &self,
        wallet: &Wallet,
        code_id: u64,
        init_msg: &impl Serialize,
        label: &str,
    ) -> Result<String, Error> {
        let init_msg = json::to_string(init_msg).map_err(handle_generic_error)?;

        let address = instantiate_contract(
            self,
            &wallet.id.0,
            code_id,
            &init_msg,
            label,
            Some(&wallet.address.0),
        )?;

        info!(
            "instantiated code {} on chain {} at {}",
            code_id, self.chain_id, address
        );

        Ok(address)
    }

    fn execute_contract(
        &self,
        wallet: &Wallet,
        contract: &str,
        msg: &impl Serialize,
    ) -> Result<json::Value, Error> {
        let msg = json::to_string(msg).map_err(handle_generic_error)?;

        debug!("executing {} on contract {}", msg, contract);

        execute_contract(self, &wallet.id.0, contract, &msg)
    }

    fn execute_increment(
        &self,
        wallet: &Wallet,
        contract: &str,
        channel: &str,
    ) -> Result<json::Value, Error> {
        self.execute_contract(
            wallet,
            contract,
            &ExecuteMsg::Increment {
                channel: channel.to_string(),
            },
        )
    }

    fn query_contract<T: DeserializeOwned>(
        &self,
        contract: &str,
        msg: &impl Serialize,
    ) -> Result<T, Error> {
        let msg = json::to_string(msg).map_err(handle_generic_error)?;

        let response = query_contract_smart(self, contract, &msg)?;

        json::from_value(response).map_err(handle_generic_error)
    }

    fn query_count(&self, contract: &str, channel: &str) -> Result<u32, Error> {
        let response: QueryResponse =
            self.query_contract(contract, &QueryMsg::get_count(channel))?;

        Ok(response.data.count)
    }

    fn query_timeout_count(&self, contract: &str, channel: &str) -> Result<u32, Error> {
        let response: QueryResponse =
            self.query_contract(contract, &QueryMsg::get_timeout_count(channel))?;

        Ok(response.data.count)
    }

    fn dump_contract_state(&self, contract: &str) -> Result<ContractStateResp, Error> {
        query_contract_state_all(self, contract)
    }

    fn query_contract_port(&self, contract: &str) -> Result<PortId, Error> {
        let info = query_contract_info(self, contract)?;

        let port = info
            .get("contract_info")
            .and_then(|info| info.get("ibc_port_id"))
            .and_then(|port| port.as_str())
            .filter(|port| !port.is_empty())
            .ok_or_else(|| eyre!("contract {} has no IBC port: {}", contract, info))?;

        let port = PortId::from_str(port)
            .map_err(|e| eyre!("invalid IBC port {} of contract {}: {}", port, contract, e))?;

        Ok(port)
    }
}
