/*!
   Constructs for running test cases with two full nodes together with the
   relayer setup, and a counter contract deployed on each chain with an
   open channel between them.
*/

use tracing::info;

use ibc_relayer_types::core::ics04_channel::channel::Ordering;
use ibc_relayer_types::core::ics04_channel::version::Version;

use crate::bootstrap::binary::channel::{bootstrap_channel_with_chains, BootstrapChannelOptions};
use crate::error::Error;
use crate::framework::base::{HasOverrides, TestConfigOverride};
use crate::framework::binary::chain::{
    run_binary_chain_test, BinaryChainTest, ClientOptionsOverride, RelayerConfigOverride,
};
use crate::framework::binary::node::{NodeConfigOverride, NodeGenesisOverride};
use crate::relayer::driver::RelayerDriver;
use crate::types::binary::chains::ConnectedChains;
use crate::types::binary::channel::ConnectedChannel;
use crate::types::config::TestConfig;
use crate::types::env::write_env;

/**
   Runs a test case that implements [`BinaryChannelTest`].
*/
pub fn run_binary_channel_test<Test, Overrides>(test: &Test) -> Result<(), Error>
where
    Test: BinaryChannelTest,
    Test: HasOverrides<Overrides = Overrides>,
    Overrides: TestConfigOverride
        + NodeConfigOverride
        + NodeGenesisOverride
        + RelayerConfigOverride
        + ClientOptionsOverride
        + ChannelOrderOverride
        + ChannelVersionOverride
        + RelayerStartOverride,
{
    run_binary_chain_test(&RunBinaryChannelTest::new(test))
}

/**
   This trait is implemented for test cases that need to have two
   full nodes running together with the relayer setup, with the counter
   contracts deployed and connected by a channel with completed handshake.
*/
pub trait BinaryChannelTest {
    /// Test runner
    fn run(
        &self,
        config: &TestConfig,
        relayer: RelayerDriver,
        chains: ConnectedChains,
        channel: ConnectedChannel,
    ) -> Result<(), Error>;
}

/**
   An internal trait for test cases to override the channel ordering
   when creating channels.

  This is called by [`RunBinaryChannelTest`] before creating
  the IBC channels.

  Test writers should implement
  [`TestOverrides`](crate::framework::overrides::TestOverrides)
  for their test cases instead of implementing this trait directly.
*/
pub trait ChannelOrderOverride {
    /**
       Return the channel ordering as [`Ordering`].
    */
    fn channel_order(&self) -> Ordering;
}

/** Facility for overriding the channel version */
pub trait ChannelVersionOverride {
    fn channel_version(&self) -> Version;
}

/**
   Whether the relayer process should be started once the channel is open.
*/
pub trait RelayerStartOverride {
    fn should_start_relayer(&self) -> bool;
}

/**
   A wrapper type that lifts a test case that implements [`BinaryChannelTest`]
   into a test case the implements [`BinaryChainTest`].
*/
pub struct RunBinaryChannelTest<'a, Test> {
    /// Inner test
    pub test: &'a Test,
}

impl<'a, Test> RunBinaryChannelTest<'a, Test>
where
    Test: BinaryChannelTest,
{
    /// Create a new [`RunBinaryChannelTest`]
    pub fn new(test: &'a Test) -> Self {
        Self { test }
    }
}

impl<'a, Test, Overrides> BinaryChainTest for RunBinaryChannelTest<'a, Test>
where
    Test: BinaryChannelTest,
    Test: HasOverrides<Overrides = Overrides>,
    Overrides: ChannelOrderOverride + ChannelVersionOverride + RelayerStartOverride,
{
    fn run(
        &self,
        config: &TestConfig,
        relayer: RelayerDriver,
        chains: ConnectedChains,
    ) -> Result<(), Error> {
        let overrides = self.test.get_overrides();

        let options = BootstrapChannelOptions::default()
            .order(overrides.channel_order())
            .version(overrides.channel_version());

        let channel = bootstrap_channel_with_chains(config, &relayer, &chains, options)?;

        if overrides.should_start_relayer() {
            relayer.start()?;
        }

        let env_path = config.chain_store_dir.join("binary-channels.env");

        write_env(&env_path, &(&relayer, &chains, &channel))?;

        info!("written channel environment to {}", env_path.display());

        self.test.run(config, relayer, chains, channel)?;

        Ok(())
    }
}

impl<'a, Test, Overrides> HasOverrides for RunBinaryChannelTest<'a, Test>
where
    Test: HasOverrides<Overrides = Overrides>,
{
    type Overrides = Overrides;

    fn get_overrides(&self) -> &Self::Overrides {
        self.test.get_overrides()
    }
}
