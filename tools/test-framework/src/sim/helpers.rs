//! Shortcuts for wiring the counter contract into simulated chains.

use cosmwasm_std::IbcOrder;
use cw_ibc_example::contract::{execute, instantiate as instantiate_entry, query};
use cw_ibc_example::ibc::{
    ibc_channel_close, ibc_channel_connect, ibc_channel_open, ibc_packet_ack, ibc_packet_receive,
    ibc_packet_timeout, IBC_VERSION,
};
use cw_ibc_example::msg::InstantiateMsg;
use ibc_relayer_types::core::ics24_host::identifier::PortId;

use crate::error::Error;
use crate::sim::chain::SimChain;
use crate::sim::contract::{Contract, ContractWrapper};
use crate::sim::path::ChannelConfig;

/// The counter contract, with its IBC entry points.
pub fn counter_contract() -> Box<dyn Contract> {
    Box::new(
        ContractWrapper::new(execute, instantiate_entry, query).with_ibc(
            ibc_channel_open,
            ibc_channel_connect,
            ibc_channel_close,
            ibc_packet_receive,
            ibc_packet_ack,
            ibc_packet_timeout,
        ),
    )
}

/// Instantiate `code_id` with an empty message from the chain's default account.
pub fn instantiate(chain: &mut SimChain, code_id: u64) -> Result<String, Error> {
    chain.instantiate_contract(code_id, &InstantiateMsg {})
}

/// An unordered `counter-1` channel on the given port.
pub fn channel_config(port_id: &PortId) -> ChannelConfig {
    ChannelConfig {
        port_id: port_id.clone(),
        version: IBC_VERSION.to_string(),
        order: IbcOrder::Unordered,
    }
}
