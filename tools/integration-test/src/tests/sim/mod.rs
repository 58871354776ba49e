/*!
   Scenarios on two simulated chains driven by a [`Coordinator`].

   Each scenario deploys the counter contract on both chains and opens
   a channel between the two contract ports with
   [`setup_counter_path`].
*/

use cw_ibc_example::msg::{GetCountResponse, QueryMsg};
use cw_ibc_test_framework::prelude::*;

pub mod can_count;
pub mod channel_close;
pub mod handshake;
pub mod light_client_expiry;
pub mod timeout_count;

/// Two counter contracts connected by an open channel.
pub struct CounterSetup {
    pub coordinator: Coordinator,
    pub path: Path,
    pub contract_a: String,
    pub contract_b: String,
    pub account_a: Account,
    pub account_b: Account,
}

impl CounterSetup {
    pub fn channel_a(&self) -> Result<String, Error> {
        Ok(self.path.endpoint_a.channel_id()?.to_string())
    }

    pub fn channel_b(&self) -> Result<String, Error> {
        Ok(self.path.endpoint_b.channel_id()?.to_string())
    }

    pub fn chain_a(&self) -> Result<&SimChain, Error> {
        self.coordinator.chain(&self.path.endpoint_a.chain_id)
    }

    pub fn chain_b(&self) -> Result<&SimChain, Error> {
        self.coordinator.chain(&self.path.endpoint_b.chain_id)
    }

    /// Send an increment from chain A and return the local count of A.
    pub fn increment_a(&mut self) -> Result<u32, Error> {
        let channel = self.channel_a()?;
        self.account_a
            .execute_increment(&mut self.coordinator, &self.contract_a, &channel)
    }

    /// Send an increment from chain B and return the local count of B.
    pub fn increment_b(&mut self) -> Result<u32, Error> {
        let channel = self.channel_b()?;
        self.account_b
            .execute_increment(&mut self.coordinator, &self.contract_b, &channel)
    }

    pub fn relay(&mut self) -> Result<(), Error> {
        self.coordinator.relay_and_ack_pending_packets(&self.path)
    }
}

/**
   Deploy the counter contract on two fresh chains and run the client,
   connection and channel handshakes between the contract ports.

   `modify_path` runs right before the handshakes, so that a scenario can
   change the client or channel configuration of either end.
*/
pub fn setup_counter_path(modify_path: impl FnOnce(&mut Path)) -> Result<CounterSetup, Error> {
    let mut coordinator = Coordinator::new(2)?;

    let chain_id_a = coordinator.chain_id(0)?;
    let chain_id_b = coordinator.chain_id(1)?;

    let (contract_a, port_a) = deploy_counter(coordinator.chain_mut(&chain_id_a)?)?;
    let (contract_b, port_b) = deploy_counter(coordinator.chain_mut(&chain_id_b)?)?;

    let mut path = Path::new(&chain_id_a, &chain_id_b);
    path.endpoint_a.channel_config = channel_config(&port_a);
    path.endpoint_b.channel_config = channel_config(&port_b);

    modify_path(&mut path);

    coordinator.setup(&mut path)?;

    info!(
        "opened channel {} <-> {} between {} and {}",
        path.endpoint_a.channel_id()?,
        path.endpoint_b.channel_id()?,
        contract_a,
        contract_b,
    );

    let account_a = Account::generate(coordinator.chain_mut(&chain_id_a)?)?;
    let account_b = Account::generate(coordinator.chain_mut(&chain_id_b)?)?;

    Ok(CounterSetup {
        coordinator,
        path,
        contract_a,
        contract_b,
        account_a,
        account_b,
    })
}

fn deploy_counter(chain: &mut SimChain) -> Result<(String, PortId), Error> {
    let code_id = chain.store_code(counter_contract());
    let contract = instantiate(chain, code_id)?;
    let port = chain.contract_port(&contract)?;

    Ok((contract, port))
}

pub fn query_count(chain: &SimChain, contract: &str, channel: &str) -> Result<u32, Error> {
    let response: GetCountResponse = chain.query_smart(
        contract,
        &QueryMsg::GetCount {
            channel: channel.to_string(),
        },
    )?;

    Ok(response.count)
}

pub fn query_timeout_count(chain: &SimChain, contract: &str, channel: &str) -> Result<u32, Error> {
    let response: GetCountResponse = chain.query_smart(
        contract,
        &QueryMsg::GetTimeoutCount {
            channel: channel.to_string(),
        },
    )?;

    Ok(response.count)
}
