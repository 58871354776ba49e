/*!
   Constructs for implementing overrides for test cases.
*/

use ibc_relayer_types::core::ics04_channel::channel::Ordering;
use ibc_relayer_types::core::ics04_channel::version::Version;

use crate::bootstrap::binary::chain::BootstrapClientOptions;
use crate::bootstrap::binary::channel::COUNTER_VERSION;
use crate::error::Error;
use crate::framework::base::{HasOverrides, TestConfigOverride};
use crate::framework::binary::chain::{ClientOptionsOverride, RelayerConfigOverride};
use crate::framework::binary::channel::{
    ChannelOrderOverride, ChannelVersionOverride, RelayerStartOverride,
};
use crate::framework::binary::node::{NodeConfigOverride, NodeGenesisOverride};
use crate::relayer::config::Config;
use crate::types::config::TestConfig;

/**
   This trait should be implemented for all test cases to allow overriding
   some parts of the behavior during the test setup.

   Since all methods in this trait have default implementation, test cases
   that do not need any override can have an empty implementation body for
   this trait.

   The trait provides generic implementation of the specialized traits such as
   [`RelayerConfigOverride`]. As a result, it is sufficient for test
   writers to only implement this trait instead of implementing the
   numerous override traits.

   When a new override trait is defined, the same trait method should
   also be defined inside this trait with a default method body.
*/
pub trait TestOverrides {
    fn modify_test_config(&self, _config: &mut TestConfig) {}

    /**
        Modify the full node config before the chain gets initialized.

        The config is in the dynamic-typed [`toml::Value`] format, as we do not
        want to model the full format of the node config in Rust. Test authors
        can use the helper methods in [`chain::config`](crate::chain::config)
        to modify common config fields.

        Implemented for [`NodeConfigOverride`].
    */
    fn modify_node_config(&self, _config: &mut toml::Value) -> Result<(), Error> {
        Ok(())
    }

    /**
        Modify the genesis file before the chain gets initialized.

        Implemented for [`NodeGenesisOverride`].
    */
    fn modify_genesis_file(&self, _genesis: &mut serde_json::Value) -> Result<(), Error> {
        Ok(())
    }

    /**
       Modify the relayer config before initializing the relayer. Does no
       modification by default.

       Implemented for [`RelayerConfigOverride`].
    */
    fn modify_relayer_config(&self, _config: &mut Config) {
        // No modification by default
    }

    /**
       Options for creating the light clients, such as a short trusting
       period. Uses the relayer's defaults by default.

       Implemented for [`ClientOptionsOverride`].
    */
    fn client_options(&self) -> BootstrapClientOptions {
        Default::default()
    }

    fn channel_order(&self) -> Ordering {
        Ordering::Unordered
    }

    /**
       The version used for opening the channel between the counter
       contracts. Returns `counter-1` by default.

       Implemented for [`ChannelVersionOverride`].
    */
    fn channel_version(&self) -> Version {
        Version::new(COUNTER_VERSION.to_string())
    }

    /**
       Start the relayer process once the channel is opened. Returns
       `true` by default.

       Implemented for [`RelayerStartOverride`].
    */
    fn should_start_relayer(&self) -> bool {
        true
    }
}

impl<Test: TestOverrides> HasOverrides for Test {
    type Overrides = Self;

    fn get_overrides(&self) -> &Self {
        self
    }
}

impl<Test: TestOverrides> TestConfigOverride for Test {
    fn modify_test_config(&self, config: &mut TestConfig) {
        TestOverrides::modify_test_config(self, config)
    }
}

impl<Test: TestOverrides> NodeConfigOverride for Test {
    fn modify_node_config(&self, config: &mut toml::Value) -> Result<(), Error> {
        TestOverrides::modify_node_config(self, config)
    }
}

impl<Test: TestOverrides> NodeGenesisOverride for Test {
    fn modify_genesis_file(&self, genesis: &mut serde_json::Value) -> Result<(), Error> {
        TestOverrides::modify_genesis_file(self, genesis)
    }
}

impl<Test: TestOverrides> RelayerConfigOverride for Test {
    fn modify_relayer_config(&self, config: &mut Config) {
        TestOverrides::modify_relayer_config(self, config)
    }
}

impl<Test: TestOverrides> ClientOptionsOverride for Test {
    fn client_options(&self) -> BootstrapClientOptions {
        TestOverrides::client_options(self)
    }
}

impl<Test: TestOverrides> ChannelOrderOverride for Test {
    fn channel_order(&self) -> Ordering {
        TestOverrides::channel_order(self)
    }
}

impl<Test: TestOverrides> ChannelVersionOverride for Test {
    fn channel_version(&self) -> Version {
        TestOverrides::channel_version(self)
    }
}

impl<Test: TestOverrides> RelayerStartOverride for Test {
    fn should_start_relayer(&self) -> bool {
        TestOverrides::should_start_relayer(self)
    }
}
