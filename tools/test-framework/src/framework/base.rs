/*!
   Entry point shared by every dockerized test: loads the [`TestConfig`]
   from the environment, installs the logger and hands a [`ChainBuilder`]
   to the test.
*/

use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

use crate::bootstrap::init::init_test;
use crate::chain::builder::ChainBuilder;
use crate::error::{handle_generic_error, Error};
use crate::types::config::TestConfig;

/**
   Runs a test case implementing [`BasicTest`], after applying its
   [`TestConfigOverride`] to the configuration read from the environment.

   A single tokio runtime is created per test. It is only used by the
   chain drivers to block on gRPC queries.
*/
pub fn run_basic_test<Test, Overrides>(test: &Test) -> Result<(), Error>
where
    Test: BasicTest,
    Test: HasOverrides<Overrides = Overrides>,
    Overrides: TestConfigOverride,
{
    let mut config = init_test()?;
    test.get_overrides().modify_test_config(&mut config);

    info!("starting test with test config: {:?}", config);

    let runtime = Arc::new(Runtime::new().map_err(handle_generic_error)?);
    let builder = ChainBuilder::new_with_config(&config, runtime);

    test.run(&config, &builder)
}

/**
   Implemented by the test case wrappers to give access to the overrides
   of the test case they wrap. Test authors get it for free by
   implementing [`TestOverrides`](crate::framework::overrides::TestOverrides).
*/
pub trait HasOverrides {
    type Overrides;

    fn get_overrides(&self) -> &Self::Overrides;
}

/**
   The outermost layer of a dockerized test. Receives the loaded
   [`TestConfig`] and a [`ChainBuilder`] for spawning chains out of it.
*/
pub trait BasicTest {
    fn run(&self, config: &TestConfig, builder: &ChainBuilder) -> Result<(), Error>;
}

/// Adjust the [`TestConfig`] before any chain is spawned.
pub trait TestConfigOverride {
    fn modify_test_config(&self, config: &mut TestConfig);
}
