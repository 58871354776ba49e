/*!
   Re-export of common constructs that are used by test cases.
*/

pub use core::time::Duration;
pub use eyre::eyre;
pub use ibc_relayer_types::core::ics04_channel::channel::Ordering;
pub use ibc_relayer_types::core::ics04_channel::version::Version;
pub use ibc_relayer_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};
pub use std::thread::sleep;
pub use tracing::{debug, error, info, warn};

pub use crate::bootstrap::binary::chain::{update_clients, BootstrapClientOptions};
pub use crate::bootstrap::binary::channel::{BootstrapChannelOptions, COUNTER_VERSION};
pub use crate::chain::driver::{wait_for_blocks, ChainDriver};
pub use crate::chain::ext::bootstrap::ChainBootstrapMethodsExt;
pub use crate::chain::ext::ibc::ChainIbcMethodsExt;
pub use crate::chain::ext::wasm::ChainWasmMethodsExt;
pub use crate::error::{handle_generic_error, Error};
pub use crate::framework::base::HasOverrides;
pub use crate::framework::binary::chain::{run_binary_chain_test, BinaryChainTest};
pub use crate::framework::binary::channel::{run_binary_channel_test, BinaryChannelTest};
pub use crate::framework::binary::node::{run_binary_node_test, BinaryNodeTest};
pub use crate::framework::overrides::TestOverrides;
pub use crate::relayer::config::Config as RelayerConfig;
pub use crate::relayer::driver::RelayerDriver;
pub use crate::sim::account::Account;
pub use crate::sim::chain::SimChain;
pub use crate::sim::coordinator::Coordinator;
pub use crate::sim::helpers::{channel_config, counter_contract, instantiate};
pub use crate::sim::path::{ClientConfig, Path, Side};
pub use crate::types::binary::chains::ConnectedChains;
pub use crate::types::binary::channel::ConnectedChannel;
pub use crate::types::client::ClientStatus;
pub use crate::types::config::TestConfig;
pub use crate::types::single::node::FullNode;
pub use crate::util::assert::{assert_eq, assert_err, assert_not_eq};
pub use crate::util::retry::assert_eventually_succeed;
pub use crate::util::suspend::suspend;
